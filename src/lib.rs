// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod anchors;
pub mod cluster;
pub mod model;

pub mod config;
pub mod evaluate;
pub mod ingest;
pub mod store;

pub mod api;
pub mod metrics;
pub mod scheduler;
pub mod service;

// ---- Re-exports for stable public API ----
pub use crate::anchors::extract_anchors;
pub use crate::api::router;
pub use crate::cluster::{build_stories, ClusterConfig, StoryClusterer};
pub use crate::model::{Article, Story};
pub use crate::service::StoryService;

use std::sync::Arc;

/// Build the full HTTP app from the environment: source catalogue, service
/// settings, metrics recorder and (optionally) the background refresher.
pub async fn app() -> anyhow::Result<axum::Router> {
    let sources = config::SourcesConfig::load_default()?;
    let settings = config::ServiceSettings::from_env();

    let service = Arc::new(StoryService::from_config(&sources, &settings)?);
    if let Some(every) = settings.refresh_interval {
        scheduler::spawn_refresh_scheduler(service.clone(), every);
    }

    let metrics = metrics::Metrics::init(settings.stale_after)?;
    let state = api::AppState::new(service).with_metrics(metrics);

    tracing::info!(
        target: "service",
        baseline = %sources.baseline_source,
        feeds = sources.feeds.len(),
        cache = %settings.cache_path.display(),
        stale_after_secs = settings.stale_after.as_secs(),
        "app configured"
    );
    Ok(api::router(state))
}
