// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::service::StoryService;

/// Spawn a background task that keeps the story cache warm: every `every`
/// it asks the service for stories, which recomputes only when the cache is
/// missing or stale.
pub fn spawn_refresh_scheduler(service: Arc<StoryService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.get_stories(false).await {
                Ok(out) => tracing::info!(
                    target: "service",
                    cache = out.cache.as_str(),
                    stories = out.stories.len(),
                    "scheduled refresh tick"
                ),
                Err(e) => tracing::warn!(target: "service", error = ?e, "scheduled refresh failed"),
            }
        }
    })
}
