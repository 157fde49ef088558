//! Randomized clustering checks: seeded snapshots built from a small
//! vocabulary so that overlaps are frequent, then every produced story is
//! checked against the matching rules.

use chrono::{Duration, TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashSet;
use uk_news_decoded::anchors::extract_anchors;
use uk_news_decoded::cluster::STRONG_SINGLE_ANCHOR_LEN;
use uk_news_decoded::{build_stories, Article, ClusterConfig};

const SOURCES: &[&str] = &["bbc", "guardian", "sky", "metro", "mirror", "itv"];

const WORDS: &[&str] = &[
    "flooding", "northern", "england", "storm", "chancellor", "budget", "downing", "street",
    "london", "strike", "rail", "nurses", "energy", "prices", "winter", "scotland", "minister",
    "the", "after", "police", "says", "pm", "in", "tower",
];

fn config() -> ClusterConfig {
    ClusterConfig::new("bbc")
        .with_min_shared("metro", 1)
        .with_min_shared("mirror", 1)
        .with_min_shared("itv", 3)
}

fn snapshot(seed: u64, n: usize) -> Vec<Article> {
    let mut rng = StdRng::seed_from_u64(seed);
    let t0 = Utc.with_ymd_and_hms(2025, 10, 13, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let source = SOURCES[rng.random_range(0..SOURCES.len())];
            let len = rng.random_range(3..8);
            let headline = (0..len)
                .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                .collect::<Vec<_>>()
                .join(" ");
            // Sub-millisecond jitter exercises the exact window boundary.
            let at = t0
                + Duration::hours(rng.random_range(-60..60))
                + Duration::microseconds(rng.random_range(-900..900));
            Article::new(source, &format!("{i}"), headline, at)
        })
        .collect()
}

#[test]
fn every_story_respects_the_matching_rules() {
    let cfg = config();
    for seed in 0..40u64 {
        let input = snapshot(seed, 60);
        let stories = build_stories(&input, &cfg);

        let baseline_ids: Vec<&str> = input
            .iter()
            .filter(|a| a.source == "bbc")
            .map(|a| a.id.as_str())
            .collect();
        let seeded: Vec<&str> = stories.iter().map(|s| s.articles[0].id.as_str()).collect();
        assert_eq!(seeded, baseline_ids, "seed {seed}: one story per baseline, in order");

        let mut placed = HashSet::new();
        for story in &stories {
            let base = &story.articles[0];
            let base_anchors = extract_anchors(&base.headline);

            let mut sources = HashSet::new();
            for a in &story.articles {
                assert!(sources.insert(a.source.as_str()), "seed {seed}: duplicate source");
                assert!(placed.insert(a.id.as_str()), "seed {seed}: article placed twice");
            }

            for a in &story.articles[1..] {
                assert_ne!(a.source, "bbc");
                let gap = (a.published_at - base.published_at).abs();
                assert!(gap <= Duration::hours(48), "seed {seed}: {} is {gap} away", a.id);

                let shared: Vec<_> = extract_anchors(&a.headline)
                    .intersection(&base_anchors)
                    .cloned()
                    .collect();
                assert!(
                    shared.len() >= cfg.required_for(&a.source),
                    "seed {seed}: {} shares {shared:?}",
                    a.id
                );
                if shared.len() == 1 {
                    assert!(shared[0].len() >= STRONG_SINGLE_ANCHOR_LEN);
                }
            }
        }
    }
}

#[test]
fn clustering_is_deterministic() {
    let cfg = config();
    for seed in [3u64, 17, 99] {
        let input = snapshot(seed, 80);
        assert_eq!(build_stories(&input, &cfg), build_stories(&input, &cfg));
    }
}

#[test]
fn unrelated_headlines_leave_singleton_stories() {
    let t0 = Utc.with_ymd_and_hms(2025, 10, 13, 8, 0, 0).unwrap();
    let input = vec![
        Article::new("bbc", "b1", "Flooding hits northern England", t0),
        Article::new("bbc", "b2", "Chancellor unveils budget", t0),
        Article::new("guardian", "g1", "Celebrity wedding photos", t0),
        Article::new("metro", "m1", "Football transfer rumours", t0),
    ];
    let stories = build_stories(&input, &config());
    assert_eq!(stories.len(), 2);
    assert!(stories.iter().all(|s| s.articles.len() == 1));
}
