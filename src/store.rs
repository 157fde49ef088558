//! # Story store
//! Persists the full story list as a pretty-printed JSON array at a cache
//! path. Freshness is the file's last-write time. Every I/O failure is
//! returned to the caller; a missing file is the only "empty" outcome.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::model::Story;

/// Cache diagnostics reported by `/api/cache`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheInfo {
    pub path: String,
    pub exists: bool,
    /// Seconds since the last write; `None` if the file does not exist.
    pub age_secs: Option<u64>,
    /// Missing caches are stale.
    pub stale: bool,
    pub stale_after_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StoryStore {
    path: PathBuf,
}

impl StoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored stories, or `None` if nothing has been written yet.
    pub fn load(&self) -> Result<Option<Vec<Story>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading story cache {}", self.path.display()))?;
        let stories: Vec<Story> = serde_json::from_str(&content).with_context(|| {
            format!(
                "parsing story cache {}; delete it or force a refresh",
                self.path.display()
            )
        })?;
        Ok(Some(stories))
    }

    /// Replace the stored list. Writes a sibling temp file and renames it
    /// over the target so readers never see a partial document.
    pub fn save(&self, stories: &[Story]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating cache directory {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(stories).context("serializing stories")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing story cache {}", self.path.display()))?;
        Ok(())
    }

    /// Time since the last successful write, `None` if there is no cache.
    pub fn age(&self) -> Result<Option<Duration>> {
        let meta = match fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("stat {}", self.path.display()));
            }
        };
        let modified = meta
            .modified()
            .with_context(|| format!("mtime of {}", self.path.display()))?;
        // Clock skew (mtime in the future) counts as brand new.
        Ok(Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or_default(),
        ))
    }

    pub fn info(&self, stale_after: Duration) -> Result<CacheInfo> {
        let age = self.age()?;
        Ok(CacheInfo {
            path: self.path.display().to_string(),
            exists: age.is_some(),
            age_secs: age.map(|a| a.as_secs()),
            stale: age.map_or(true, |a| a > stale_after),
            stale_after_secs: stale_after.as_secs(),
        })
    }
}
