// src/ingest/types.rs
use anyhow::Result;
use serde::Serialize;

use crate::model::Article;

/// One outlet's feed. Implementations must keep entry order.
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_articles(&self) -> Result<Vec<Article>>;
    /// Source identifier stamped on every article (e.g. "bbc").
    fn source(&self) -> &str;
}

/// Per-source result of one ingest run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub articles: usize,
    pub error: Option<String>,
}

/// Everything one ingest run produced: the merged articles plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub articles: Vec<Article>,
    pub outcomes: Vec<SourceOutcome>,
}

impl IngestReport {
    pub fn failed_sources(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_some())
            .map(|o| o.source.as_str())
            .collect()
    }

    /// True when there were providers and every one of them failed.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.error.is_some())
    }
}
