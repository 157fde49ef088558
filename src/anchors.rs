//! # Anchor extraction
//! Maps a headline to the set of content-bearing keywords ("anchors") used
//! as the unit of overlap when matching articles to stories.
//!
//! Tokens are lowercase ASCII runs of a letter followed by two or more
//! letters or hyphens. Stopwords, generic newsroom words and tokens of
//! four characters or fewer are dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Tokens of this length or shorter never become anchors.
pub const MAX_DISCARDED_LEN: usize = 4;

/// Number of anchors shown in a story's topic label.
pub const TOPIC_ANCHORS: usize = 4;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z][a-z-]{2,}").expect("anchor token regex"));

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "to", "of", "in", "on", "for", "with", "after", "over", "as",
    "by", "from", "is", "are", "was", "were",
];

const GENERIC_WORDS: &[&str] = &[
    "says", "said", "pm", "president", "leader", "government", "uk", "us", "britain", "attack",
    "raid", "response", "warning", "man", "woman", "people", "police",
];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

pub fn is_generic(token: &str) -> bool {
    GENERIC_WORDS.contains(&token)
}

fn is_anchor(token: &str) -> bool {
    token.len() > MAX_DISCARDED_LEN && !is_stopword(token) && !is_generic(token)
}

/// Distinct anchors in order of first occurrence.
pub fn ordered_anchors(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| is_anchor(t))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Anchor set of a headline. Pure: equal input gives an equal set.
pub fn extract_anchors(text: &str) -> HashSet<String> {
    ordered_anchors(text).into_iter().collect()
}

/// Display label for a story: the first [`TOPIC_ANCHORS`] anchors of the
/// seeding headline, comma separated.
pub fn topic_label(headline: &str) -> String {
    ordered_anchors(headline)
        .into_iter()
        .take(TOPIC_ANCHORS)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flooding_headline_keeps_content_words() {
        let got = extract_anchors("Flooding hits northern England after the storm");
        assert_eq!(got, set(&["flooding", "northern", "england", "storm"]));
    }

    #[test]
    fn generic_and_short_words_are_dropped() {
        let got = extract_anchors("Police say UK government response to attack was swift");
        // "swift" is the only survivor: "police", "government", "response",
        // "attack" are generic, the rest are short or stopwords.
        assert_eq!(got, set(&["swift"]));
    }

    #[test]
    fn digits_and_punctuation_split_tokens() {
        let got = extract_anchors("COVID-19: hospitals' strain,winter2025");
        // "covid-" keeps the trailing hyphen, "winter" is cut at the digit.
        assert_eq!(got, set(&["covid-", "hospitals", "strain", "winter"]));
    }

    #[test]
    fn hyphenated_words_stay_whole() {
        let got = extract_anchors("Anti-strike legislation passes");
        assert_eq!(got, set(&["anti-strike", "legislation", "passes"]));
    }

    #[test]
    fn empty_and_symbol_only_input_yield_nothing() {
        assert!(extract_anchors("").is_empty());
        assert!(extract_anchors("123 -- !!! ??").is_empty());
    }

    #[test]
    fn ordered_anchors_dedup_in_first_occurrence_order() {
        let got = ordered_anchors("Storm Amy: storm warnings as Amy nears Scotland");
        assert_eq!(got, vec!["storm", "warnings", "nears", "scotland"]);
    }

    #[test]
    fn topic_label_takes_first_four() {
        let label = topic_label("Chancellor unveils budget plans for Downing Street");
        assert_eq!(label, "chancellor, unveils, budget, plans");
        assert_eq!(topic_label("the end"), "");
    }

    #[test]
    fn output_never_contains_filtered_tokens() {
        let text = "The president said the police and the people of Britain were warned over a raid";
        for a in extract_anchors(text) {
            assert!(a.len() > MAX_DISCARDED_LEN, "{a} too short");
            assert!(!is_stopword(&a), "{a} is a stopword");
            assert!(!is_generic(&a), "{a} is generic");
        }
    }
}
