//! # Story clustering
//! Pure, single-pass assignment of articles to baseline stories.
//! No I/O and no retained state: the same article list always yields the
//! same story list.
//!
//! Every baseline-source article seeds one story. Every other article is
//! attached to the eligible story sharing the most anchors with its
//! baseline headline (earliest story wins ties), or dropped if no story is
//! eligible. Eligibility:
//! - published within `time_window_hours` of the story's baseline article,
//! - no article from the same source already in the story,
//! - at least `required(source)` shared anchors,
//! - a lone shared anchor must be at least [`STRONG_SINGLE_ANCHOR_LEN`] long.

use std::collections::{HashMap, HashSet};

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::anchors::{extract_anchors, topic_label};
use crate::model::{story_id, Article, Story};

pub const DEFAULT_MIN_SHARED: usize = 2;
pub const DEFAULT_TIME_WINDOW_HOURS: i64 = 48;

/// Minimum length of a single shared anchor for it to count on its own.
pub const STRONG_SINGLE_ANCHOR_LEN: usize = 7;

/// Immutable clustering parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    pub baseline_source: String,
    pub min_shared_by_source: HashMap<String, usize>,
    /// Used for sources absent from `min_shared_by_source`.
    pub default_min_shared: usize,
    pub time_window_hours: i64,
}

impl ClusterConfig {
    pub fn new(baseline_source: impl Into<String>) -> Self {
        Self {
            baseline_source: baseline_source.into(),
            min_shared_by_source: HashMap::new(),
            default_min_shared: DEFAULT_MIN_SHARED,
            time_window_hours: DEFAULT_TIME_WINDOW_HOURS,
        }
    }

    pub fn with_min_shared(mut self, source: impl Into<String>, min_shared: usize) -> Self {
        self.min_shared_by_source.insert(source.into(), min_shared);
        self
    }

    pub fn with_time_window_hours(mut self, hours: i64) -> Self {
        self.time_window_hours = hours;
        self
    }

    /// Shared anchors an article from `source` needs. Never below 1: an
    /// article sharing nothing with a story is never attached to it.
    pub fn required_for(&self, source: &str) -> usize {
        self.min_shared_by_source
            .get(source)
            .copied()
            .unwrap_or(self.default_min_shared)
            .max(1)
    }

    /// Full-precision comparison: 48h plus a microsecond is outside.
    fn within_window(&self, a: &Article, b: &Article) -> bool {
        let window = TimeDelta::try_hours(self.time_window_hours).unwrap_or(TimeDelta::MAX);
        (a.published_at - b.published_at).abs() <= window
    }
}

/// Owns a [`ClusterConfig`] and runs [`build_stories`] with it.
#[derive(Debug, Clone)]
pub struct StoryClusterer {
    cfg: ClusterConfig,
}

impl StoryClusterer {
    pub fn new(cfg: ClusterConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.cfg
    }

    pub fn build_stories(&self, articles: &[Article]) -> Vec<Story> {
        build_stories(articles, &self.cfg)
    }
}

/// Why a story was not eligible for an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyStory,
    OutsideWindow,
    SourceAlreadyPresent,
    TooFewShared { shared: usize, required: usize },
    WeakSingleAnchor,
}

/// Story under construction, with its baseline anchors computed once.
struct Seed {
    story: Story,
    anchors: HashSet<String>,
}

/// Number of shared anchors if `story` may take `article`.
fn score_candidate(
    cfg: &ClusterConfig,
    article: &Article,
    anchors: &HashSet<String>,
    required: usize,
    seed: &Seed,
) -> Result<usize, Rejection> {
    let Some(baseline) = seed.story.baseline() else {
        return Err(Rejection::EmptyStory);
    };
    if !cfg.within_window(article, baseline) {
        return Err(Rejection::OutsideWindow);
    }
    if seed.story.has_source(&article.source) {
        return Err(Rejection::SourceAlreadyPresent);
    }

    let shared: Vec<&String> = anchors.intersection(&seed.anchors).collect();
    if shared.len() < required {
        return Err(Rejection::TooFewShared {
            shared: shared.len(),
            required,
        });
    }
    if let [lone] = shared.as_slice() {
        if lone.len() < STRONG_SINGLE_ANCHOR_LEN {
            return Err(Rejection::WeakSingleAnchor);
        }
    }
    Ok(shared.len())
}

/// Evaluate one article against one story; exposed for diagnostics and tests.
pub fn check_candidate(
    cfg: &ClusterConfig,
    article: &Article,
    story: &Story,
) -> Result<usize, Rejection> {
    let seed = Seed {
        anchors: story
            .baseline()
            .map(|b| extract_anchors(&b.headline))
            .unwrap_or_default(),
        story: story.clone(),
    };
    let anchors = extract_anchors(&article.headline);
    score_candidate(cfg, article, &anchors, cfg.required_for(&article.source), &seed)
}

/// Build the story list for one article snapshot.
pub fn build_stories(articles: &[Article], cfg: &ClusterConfig) -> Vec<Story> {
    let (baseline, others): (Vec<&Article>, Vec<&Article>) = articles
        .iter()
        .partition(|a| a.source == cfg.baseline_source);

    // 1) One story per baseline article, in input order
    let mut seeds: Vec<Seed> = baseline
        .iter()
        .enumerate()
        .map(|(i, a)| Seed {
            story: Story {
                story_id: story_id(i),
                topic: topic_label(&a.headline),
                articles: vec![(*a).clone()],
            },
            anchors: extract_anchors(&a.headline),
        })
        .collect();

    // 2) Greedy assignment; strict `>` keeps the earliest story on ties
    let mut assigned = 0usize;
    for article in others {
        let anchors = extract_anchors(&article.headline);
        let required = cfg.required_for(&article.source);

        let mut best: Option<(usize, usize)> = None;
        for (idx, seed) in seeds.iter().enumerate() {
            let Ok(score) = score_candidate(cfg, article, &anchors, required, seed) else {
                continue;
            };
            if score > best.map(|(_, s)| s).unwrap_or(0) {
                best = Some((idx, score));
            }
        }

        if let Some((idx, score)) = best {
            let story = &mut seeds[idx].story;
            debug!(
                target: "cluster",
                article = %article.id,
                story = %story.story_id,
                shared = score,
                "article attached"
            );
            story.articles.push(article.clone());
            assigned += 1;
        }
    }

    let stories: Vec<Story> = seeds.into_iter().map(|s| s.story).collect();
    info!(
        target: "cluster",
        baseline = %cfg.baseline_source,
        stories = stories.len(),
        assigned,
        dropped = articles.len() - stories.len() - assigned,
        "clustering finished"
    );
    stories
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 13, 8, 0, 0).unwrap()
    }

    fn art(source: &str, id: &str, headline: &str, hours: i64) -> Article {
        Article::new(source, id, headline, t0() + Duration::hours(hours))
    }

    fn cfg() -> ClusterConfig {
        ClusterConfig::new("bbc").with_min_shared("metro", 1)
    }

    #[test]
    fn baseline_articles_seed_stories_in_order() {
        let input = vec![
            art("guardian", "g1", "Something unrelated entirely", 0),
            art("bbc", "b1", "Flooding hits northern England after the storm", 0),
            art("bbc", "b2", "Chancellor unveils budget plans", 1),
        ];
        let stories = build_stories(&input, &cfg());
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].story_id, "story-001");
        assert_eq!(stories[0].topic, "flooding, northern, england, storm");
        assert_eq!(stories[0].articles[0].id, "bbc-b1");
        assert_eq!(stories[1].story_id, "story-002");
        assert_eq!(stories[1].articles.len(), 1);
    }

    #[test]
    fn matching_candidate_is_attached() {
        let input = vec![
            art("bbc", "b1", "Flooding hits northern England after the storm", 0),
            art("sky", "s1", "Storm causes flooding across northern England", 3),
        ];
        let stories = build_stories(&input, &cfg());
        assert_eq!(stories[0].articles.len(), 2);
        assert_eq!(stories[0].articles[1].id, "sky-s1");
    }

    #[test]
    fn window_is_inclusive_at_exactly_48_hours() {
        let base = art("bbc", "b1", "Flooding hits northern England after the storm", 0);
        let at_edge = art("sky", "s1", "Storm flooding northern England", 48);
        let past_edge = Article {
            published_at: t0() + Duration::hours(48) + Duration::seconds(1),
            ..art("itv", "i1", "Storm flooding northern England", 0)
        };
        let before = art("guardian", "g1", "Storm flooding northern England", -48);

        let stories = build_stories(&[base, at_edge, past_edge, before], &cfg());
        let ids: Vec<_> = stories[0].articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["bbc-b1", "sky-s1", "guardian-g1"]);
    }

    #[test]
    fn sub_millisecond_overshoot_is_outside_the_window() {
        let c = cfg();
        let base = art("bbc", "b1", "Flooding hits northern England after the storm", 0);
        let late = Article {
            published_at: t0() + Duration::hours(48) + Duration::microseconds(1),
            ..art("sky", "s1", "Storm causes flooding across northern England", 0)
        };
        let early = Article {
            published_at: t0() - Duration::hours(48) - Duration::microseconds(1),
            ..art("itv", "i1", "Storm causes flooding across northern England", 0)
        };

        let stories = build_stories(&[base, late.clone(), early.clone()], &c);
        assert_eq!(stories[0].articles.len(), 1);
        assert_eq!(check_candidate(&c, &late, &stories[0]), Err(Rejection::OutsideWindow));
        assert_eq!(check_candidate(&c, &early, &stories[0]), Err(Rejection::OutsideWindow));
    }

    #[test]
    fn second_article_from_same_source_goes_elsewhere_or_nowhere() {
        let input = vec![
            art("bbc", "b1", "Flooding hits northern England after the storm", 0),
            art("sky", "s1", "Storm flooding northern England", 1),
            art("sky", "s2", "Northern England flooding storm latest", 2),
        ];
        let stories = build_stories(&input, &cfg());
        assert_eq!(stories[0].articles.len(), 2);
        assert_eq!(stories[0].articles[1].id, "sky-s1");
    }

    #[test]
    fn lone_anchor_must_be_strong() {
        let story_london = art("bbc", "b1", "Fire breaks out in London tower", 0);
        let story_downing = art("bbc", "b2", "Protest outside Downing Street", 0);

        let weak = art("metro", "m1", "London marathon record", 1);
        let strong = art("metro", "m2", "Downing celebrations tonight", 1);

        let c = cfg();
        let built = build_stories(&[story_london.clone(), story_downing.clone()], &c);
        assert_eq!(check_candidate(&c, &weak, &built[0]), Err(Rejection::WeakSingleAnchor));
        assert_eq!(check_candidate(&c, &strong, &built[1]), Ok(1));

        let stories = build_stories(&[story_london, story_downing, weak, strong], &c);
        assert_eq!(stories[0].articles.len(), 1);
        assert_eq!(stories[1].articles.len(), 2);
    }

    #[test]
    fn default_requirement_is_two() {
        let c = cfg();
        assert_eq!(c.required_for("guardian"), 2);
        assert_eq!(c.required_for("metro"), 1);

        let base = art("bbc", "b1", "Protest outside Downing Street", 0);
        let one = art("guardian", "g1", "Downing celebrations tonight", 1);
        let stories = build_stories(&[base], &c);
        assert_eq!(
            check_candidate(&c, &one, &stories[0]),
            Err(Rejection::TooFewShared {
                shared: 1,
                required: 2
            })
        );
    }

    #[test]
    fn zero_requirement_is_treated_as_one() {
        let c = ClusterConfig::new("bbc").with_min_shared("metro", 0);
        assert_eq!(c.required_for("metro"), 1);

        let input = vec![
            art("bbc", "b1", "Flooding hits northern England", 0),
            art("metro", "m1", "Celebrity wedding photos", 0),
        ];
        let stories = build_stories(&input, &c);
        assert_eq!(stories[0].articles.len(), 1);
    }

    #[test]
    fn ties_keep_the_earlier_story() {
        let input = vec![
            art("bbc", "b1", "Energy prices climb sharply nationwide", 0),
            art("bbc", "b2", "Energy prices climb sharply abroad", 0),
            art("guardian", "g1", "Energy prices climb sharply again", 1),
        ];
        let stories = build_stories(&input, &cfg());
        assert_eq!(stories[0].articles.len(), 2);
        assert_eq!(stories[1].articles.len(), 1);
    }

    #[test]
    fn higher_score_beats_earlier_story() {
        let input = vec![
            art("bbc", "b1", "Energy prices climb sharply", 0),
            art("bbc", "b2", "Energy prices climb sharply amid winter shortages", 0),
            art("guardian", "g1", "Winter shortages push energy prices climb", 1),
        ];
        let stories = build_stories(&input, &cfg());
        assert_eq!(stories[0].articles.len(), 1);
        assert_eq!(stories[1].articles.len(), 2);
    }

    #[test]
    fn no_baseline_means_no_stories() {
        let input = vec![art("sky", "s1", "Storm flooding northern England", 0)];
        assert!(build_stories(&input, &cfg()).is_empty());
        assert!(build_stories(&[], &cfg()).is_empty());
    }

    #[test]
    fn clusterer_is_stateless_between_runs() {
        let clusterer = StoryClusterer::new(cfg());
        let input = vec![
            art("bbc", "b1", "Flooding hits northern England after the storm", 0),
            art("sky", "s1", "Storm causes flooding across northern England", 3),
        ];
        let a = clusterer.build_stories(&input);
        let b = clusterer.build_stories(&input);
        assert_eq!(a, b);
    }
}
