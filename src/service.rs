//! # Story service
//! Serves the cached story list while it is fresh and recomputes it
//! (ingest → cluster → persist → evaluate) when it is missing, stale or a
//! refresh is forced.
//!
//! Recomputation is serialized: concurrent callers that all see a stale
//! cache wait for one refresh and then read its result. If every feed fails
//! and an older cache exists, that cache is served instead of an empty list.

use anyhow::{bail, Context, Result};
use metrics::{counter, gauge};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::cluster::StoryClusterer;
use crate::config::{ServiceSettings, SourcesConfig};
use crate::evaluate;
use crate::ingest::{self, types::FeedProvider};
use crate::model::Story;
use crate::store::{CacheInfo, StoryStore};

/// How the returned stories were obtained; reported in `X-Stories-Cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Fresh cache.
    Hit,
    /// Recomputed for this request.
    Miss,
    /// Refresh failed; an out-of-date cache was served.
    Stale,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoriesOutcome {
    pub stories: Vec<Story>,
    pub cache: CacheStatus,
}

pub struct StoryService {
    providers: Vec<Box<dyn FeedProvider>>,
    clusterer: StoryClusterer,
    store: StoryStore,
    stale_after: Duration,
    refresh_lock: Mutex<()>,
}

impl StoryService {
    pub fn new(
        providers: Vec<Box<dyn FeedProvider>>,
        clusterer: StoryClusterer,
        store: StoryStore,
        stale_after: Duration,
    ) -> Self {
        Self {
            providers,
            clusterer,
            store,
            stale_after,
            refresh_lock: Mutex::new(()),
        }
    }

    /// HTTP feeds from the source catalogue, cache location from settings.
    pub fn from_config(sources: &SourcesConfig, settings: &ServiceSettings) -> Result<Self> {
        let providers = ingest::providers_from_config(sources, settings.feed_timeout)?;
        Ok(Self::new(
            providers,
            StoryClusterer::new(sources.cluster_config()),
            StoryStore::new(settings.cache_path.clone()),
            settings.stale_after,
        ))
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn cache_info(&self) -> Result<CacheInfo> {
        self.store.info(self.stale_after)
    }

    /// Full, unfiltered story list.
    pub async fn get_stories(&self, force_refresh: bool) -> Result<StoriesOutcome> {
        if !force_refresh {
            if let Some(stories) = self.fresh_cached()? {
                counter!("stories_cache_hits_total").increment(1);
                return Ok(StoriesOutcome {
                    stories,
                    cache: CacheStatus::Hit,
                });
            }
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if !force_refresh {
            if let Some(stories) = self.fresh_cached()? {
                counter!("stories_cache_hits_total").increment(1);
                return Ok(StoriesOutcome {
                    stories,
                    cache: CacheStatus::Hit,
                });
            }
        }

        let stories = match self.collect_and_cluster().await {
            Ok(stories) => stories,
            Err(e) => {
                // Only a failed ingest may fall back; store errors always surface.
                return match self.store.load()? {
                    Some(stories) => {
                        tracing::warn!(
                            target: "service",
                            error = ?e,
                            "refresh failed, serving stale cache"
                        );
                        counter!("stories_cache_stale_served_total").increment(1);
                        Ok(StoriesOutcome {
                            stories,
                            cache: CacheStatus::Stale,
                        })
                    }
                    None => Err(e),
                };
            }
        };

        self.persist(&stories)?;
        counter!("stories_cache_misses_total").increment(1);
        Ok(StoriesOutcome {
            stories,
            cache: CacheStatus::Miss,
        })
    }

    /// Recompute and persist unconditionally.
    pub async fn refresh(&self) -> Result<Vec<Story>> {
        let _guard = self.refresh_lock.lock().await;
        let stories = self.collect_and_cluster().await?;
        self.persist(&stories)?;
        Ok(stories)
    }

    fn fresh_cached(&self) -> Result<Option<Vec<Story>>> {
        let info = self.cache_info()?;
        if !info.exists || info.stale {
            return Ok(None);
        }
        self.store.load()
    }

    async fn collect_and_cluster(&self) -> Result<Vec<Story>> {
        let report = ingest::run_once(&self.providers).await;
        if report.all_failed() {
            bail!("every feed failed: {}", report.failed_sources().join(", "));
        }

        let stories = self.clusterer.build_stories(&report.articles);
        counter!("cluster_runs_total").increment(1);
        gauge!("cluster_last_stories").set(stories.len() as f64);
        gauge!("cluster_last_matched_stories")
            .set(stories.iter().filter(|s| s.is_matched()).count() as f64);
        Ok(stories)
    }

    fn persist(&self, stories: &[Story]) -> Result<()> {
        self.store.save(stories).context("persisting stories")?;
        gauge!("stories_last_refresh_ts").set(chrono::Utc::now().timestamp() as f64);
        evaluate::log_summary(stories, 5);
        Ok(())
    }
}
