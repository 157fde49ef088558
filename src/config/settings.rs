//! Service settings read from the environment (`.env` is loaded by the binaries).

use std::path::PathBuf;
use std::time::Duration;

pub const ENV_CACHE_PATH: &str = "STORIES_CACHE_PATH";
pub const ENV_STALE_AFTER_SECS: &str = "STORIES_STALE_AFTER_SECS";
pub const ENV_FEED_TIMEOUT_SECS: &str = "FEED_TIMEOUT_SECS";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "STORIES_REFRESH_INTERVAL_SECS";

pub const DEFAULT_CACHE_PATH: &str = "data/stories.json";
pub const DEFAULT_STALE_AFTER_SECS: u64 = 1800;
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub cache_path: PathBuf,
    /// Cached stories older than this are recomputed on the next request.
    pub stale_after: Duration,
    pub feed_timeout: Duration,
    /// `None` disables the background refresh task.
    pub refresh_interval: Option<Duration>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            stale_after: Duration::from_secs(DEFAULT_STALE_AFTER_SECS),
            feed_timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
            refresh_interval: None,
        }
    }
}

impl ServiceSettings {
    pub fn from_env() -> Self {
        let d = Self::default();
        let cache_path = std::env::var(ENV_CACHE_PATH)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(d.cache_path);

        let stale_after = parse_secs_env(std::env::var(ENV_STALE_AFTER_SECS).ok())
            .map(Duration::from_secs)
            .unwrap_or(d.stale_after);

        let feed_timeout = parse_secs_env(std::env::var(ENV_FEED_TIMEOUT_SECS).ok())
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(d.feed_timeout);

        let refresh_interval = parse_secs_env(std::env::var(ENV_REFRESH_INTERVAL_SECS).ok())
            .filter(|s| *s > 0)
            .map(Duration::from_secs);

        Self {
            cache_path,
            stale_after,
            feed_timeout,
            refresh_interval,
        }
    }
}

fn parse_secs_env(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}
