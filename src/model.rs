//! Article and story records shared by ingestion, clustering, storage and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One headline from one outlet's feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// `"{source}-{entry id or link}"`
    pub id: String,
    pub source: String,
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub bias_score: f32,
    /// Reserved for similarity matching; clustering ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Article {
    /// Article with neutral defaults for the fields feeds don't provide.
    pub fn new(
        source: impl Into<String>,
        entry_id: &str,
        headline: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let source = source.into();
        Self {
            id: format!("{}-{}", source, entry_id),
            source,
            headline: headline.into(),
            summary: String::new(),
            url: String::new(),
            published_at,
            bias_score: 0.0,
            embedding: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// A cluster of articles reporting the same event. `articles[0]` is the
/// baseline article that seeded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub story_id: String,
    pub topic: String,
    pub articles: Vec<Article>,
}

impl Story {
    pub fn baseline(&self) -> Option<&Article> {
        self.articles.first()
    }

    pub fn has_source(&self, source: &str) -> bool {
        self.articles.iter().any(|a| a.source == source)
    }

    /// Stories worth showing have at least one article besides the baseline.
    pub fn is_matched(&self) -> bool {
        self.articles.len() >= 2
    }
}

/// `story-001`, `story-002`, ... (1-based).
pub fn story_id(index: usize) -> String {
    format!("story-{:03}", index + 1)
}
