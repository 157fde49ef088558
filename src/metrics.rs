use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;

/// The recorder is process-global; later `init` calls reuse the first handle.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the staleness threshold.
    pub fn init(stale_after: Duration) -> Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                PrometheusBuilder::new()
                    .install_recorder()
                    .context("prometheus: install recorder")
            })?
            .clone();

        describe();
        gauge!("stories_cache_stale_after_secs").set(stale_after.as_secs() as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("ingest_articles_total", "Articles parsed per source.");
    describe_counter!(
        "ingest_source_errors_total",
        "Feed fetch/parse failures per source."
    );
    describe_histogram!("ingest_fetch_ms", "Feed fetch + parse time in milliseconds.");
    describe_counter!("cluster_runs_total", "Clustering runs.");
    describe_gauge!("cluster_last_stories", "Stories produced by the last run.");
    describe_gauge!(
        "cluster_last_matched_stories",
        "Stories with at least two articles in the last run."
    );
    describe_counter!("stories_cache_hits_total", "Requests served from the story cache.");
    describe_counter!("stories_cache_misses_total", "Requests that recomputed stories.");
    describe_counter!(
        "stories_cache_stale_served_total",
        "Requests served from a stale cache after a failed refresh."
    );
    describe_gauge!("stories_last_refresh_ts", "Unix ts of the last successful refresh.");
    describe_gauge!(
        "stories_cache_stale_after_secs",
        "Configured cache staleness threshold."
    );
}
