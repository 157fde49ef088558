//! # Source catalogue
//!
//! Which outlets are fetched, which one seeds stories, and how strict
//! matching is per outlet. Loaded from TOML:
//!
//! ```toml
//! baseline_source = "bbc"
//! time_window_hours = 48
//! default_min_shared = 2
//!
//! [feeds]
//! bbc = "https://feeds.bbci.co.uk/news/rss.xml"
//!
//! [min_shared]
//! metro = 1
//! ```
//!
//! Lookup order: `$SOURCES_CONFIG_PATH` → `config/sources.toml` → built-in seed.
//! Source identifiers are trimmed and lowercased on load.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cluster::{ClusterConfig, DEFAULT_MIN_SHARED, DEFAULT_TIME_WINDOW_HOURS};

pub const ENV_SOURCES_CONFIG_PATH: &str = "SOURCES_CONFIG_PATH";
pub const DEFAULT_SOURCES_CONFIG_PATH: &str = "config/sources.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_baseline")]
    pub baseline_source: String,
    #[serde(default = "default_time_window_hours")]
    pub time_window_hours: i64,
    #[serde(default = "default_min_shared")]
    pub default_min_shared: usize,
    /// source id → feed URL
    #[serde(default)]
    pub feeds: BTreeMap<String, String>,
    /// source id → minimum shared anchors
    #[serde(default)]
    pub min_shared: BTreeMap<String, usize>,
}

fn default_baseline() -> String {
    "bbc".to_string()
}

fn default_time_window_hours() -> i64 {
    DEFAULT_TIME_WINDOW_HOURS
}

fn default_min_shared() -> usize {
    DEFAULT_MIN_SHARED
}

impl SourcesConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sources config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing sources config {}", path.display()))
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SOURCES_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{} points to non-existent path {}",
                    ENV_SOURCES_CONFIG_PATH,
                    pb.display()
                ));
            }
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_SOURCES_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        tracing::info!(target: "config", "no sources config found, using built-in seed");
        Ok(Self::default_seed())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: SourcesConfig = toml::from_str(s)?;
        raw.normalized()
    }

    /// Lowercase/trim identifiers and validate the result.
    fn normalized(self) -> Result<Self> {
        let baseline_source = clean_id(&self.baseline_source);
        if baseline_source.is_empty() {
            bail!("baseline_source must not be empty");
        }
        if self.time_window_hours < 0 {
            bail!("time_window_hours must not be negative");
        }

        let mut feeds = BTreeMap::new();
        for (id, url) in self.feeds {
            let id = clean_id(&id);
            let url = url.trim().to_string();
            if id.is_empty() || url.is_empty() {
                continue;
            }
            feeds.insert(id, url);
        }

        let min_shared = self
            .min_shared
            .into_iter()
            .map(|(id, n)| (clean_id(&id), n))
            .filter(|(id, _)| !id.is_empty())
            .collect();

        if !feeds.is_empty() && !feeds.contains_key(&baseline_source) {
            tracing::warn!(
                target: "config",
                baseline = %baseline_source,
                "baseline source has no feed; every run will produce zero stories"
            );
        }

        Ok(Self {
            baseline_source,
            time_window_hours: self.time_window_hours,
            default_min_shared: self.default_min_shared,
            feeds,
            min_shared,
        })
    }

    /// Minimum shared anchors for `source` (`default_min_shared` if unlisted),
    /// as enforced by clustering: never below 1.
    pub fn min_shared_for(&self, source: &str) -> usize {
        self.min_shared
            .get(&clean_id(source))
            .copied()
            .unwrap_or(self.default_min_shared)
            .max(1)
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            baseline_source: self.baseline_source.clone(),
            min_shared_by_source: self
                .min_shared
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            default_min_shared: self.default_min_shared,
            time_window_hours: self.time_window_hours,
        }
    }

    /// Built-in catalogue of UK outlets with the BBC as baseline.
    pub fn default_seed() -> Self {
        let mut feeds = BTreeMap::new();
        for (id, url) in [
            ("bbc", "https://feeds.bbci.co.uk/news/rss.xml"),
            ("guardian", "https://www.theguardian.com/uk/rss"),
            ("sky", "https://feeds.skynews.com/feeds/rss/uk.xml"),
            ("independent", "https://www.independent.co.uk/news/uk/rss"),
            ("metro", "https://metro.co.uk/news/uk/feed/"),
            ("standard", "https://www.standard.co.uk/news/uk/rss"),
            ("itv", "https://www.itv.com/news/rss"),
            ("mirror", "https://www.mirror.co.uk/news/uk-news/rss.xml"),
        ] {
            feeds.insert(id.to_string(), url.to_string());
        }

        let mut min_shared = BTreeMap::new();
        for (id, n) in [
            ("bbc", 2),
            ("guardian", 2),
            ("sky", 2),
            ("independent", 2),
            ("itv", 2),
            ("standard", 1),
            ("metro", 1),
            ("mirror", 1),
            ("telegraph", 1),
        ] {
            min_shared.insert(id.to_string(), n);
        }

        Self {
            baseline_source: default_baseline(),
            time_window_hours: DEFAULT_TIME_WINDOW_HOURS,
            default_min_shared: DEFAULT_MIN_SHARED,
            feeds,
            min_shared,
        }
    }
}

fn clean_id(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}
