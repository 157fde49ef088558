//! Summary statistics for one clustering run, logged after every refresh.

use serde::Serialize;
use std::fmt;

use crate::model::Story;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    pub total_articles: usize,
    pub stories: usize,
    pub stories_with_matches: usize,
    pub avg_articles_per_story: f64,
}

pub fn summarize(stories: &[Story]) -> EvalSummary {
    let total_articles: usize = stories.iter().map(|s| s.articles.len()).sum();
    let stories_with_matches = stories.iter().filter(|s| s.is_matched()).count();
    EvalSummary {
        total_articles,
        stories: stories.len(),
        stories_with_matches,
        avg_articles_per_story: total_articles as f64 / stories.len().max(1) as f64,
    }
}

impl fmt::Display for EvalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} articles -> {} stories, {} with matches, {:.2} articles/story",
            self.total_articles, self.stories, self.stories_with_matches, self.avg_articles_per_story
        )
    }
}

/// Log the summary plus the first `preview` stories.
pub fn log_summary(stories: &[Story], preview: usize) -> EvalSummary {
    let summary = summarize(stories);
    tracing::info!(
        target: "eval",
        total_articles = summary.total_articles,
        stories = summary.stories,
        stories_with_matches = summary.stories_with_matches,
        avg = summary.avg_articles_per_story,
        "{}",
        summary
    );
    for s in stories.iter().take(preview) {
        tracing::info!(
            target: "eval",
            story = %s.story_id,
            topic = %s.topic,
            articles = s.articles.len(),
            "story preview"
        );
    }
    summary
}
