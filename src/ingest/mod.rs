// src/ingest/mod.rs
pub mod providers;
pub mod types;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::future::join_all;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::SourcesConfig;
use crate::ingest::providers::rss::RssProvider;
use crate::ingest::types::{FeedProvider, IngestReport, SourceOutcome};

/// Headlines longer than this are cut.
pub const MAX_HEADLINE_CHARS: usize = 300;
/// Summaries longer than this are cut.
pub const MAX_SUMMARY_CHARS: usize = 1500;

/// Normalize feed text: strip tags, decode entities, ASCII quotes, collapse
/// whitespace, cap length at `max_chars`.
///
/// Only `<` followed by a letter (or `/letter`) opens a tag, and tags are
/// removed before entities are decoded, so escaped text such as
/// `&lt;3% ... &gt; 90%` survives as literal `<3% ... > 90%`.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    // 1) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags =
        RE_TAGS.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("tag regex"));
    let stripped = re_tags.replace_all(s, " ");

    // 2) HTML entity decode
    let mut out = html_escape::decode_html_entities(&stripped).to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect();
    }

    out
}

/// Build one HTTP-backed provider per configured feed, sharing one client.
pub fn providers_from_config(
    sources: &SourcesConfig,
    timeout: Duration,
) -> Result<Vec<Box<dyn FeedProvider>>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("uk-news-decoded/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building feed http client")?;

    Ok(sources
        .feeds
        .iter()
        .map(|(source, url)| {
            Box::new(RssProvider::from_url(source, url, client.clone())) as Box<dyn FeedProvider>
        })
        .collect())
}

/// Fetch every provider concurrently and merge the results in provider
/// order once all of them have finished. A failing provider contributes no
/// articles and is reported in the outcome list; the others proceed.
pub async fn run_once(providers: &[Box<dyn FeedProvider>]) -> IngestReport {
    let fetches = providers.iter().map(|p| async move {
        let t0 = Instant::now();
        let res = p.fetch_articles().await;
        histogram!("ingest_fetch_ms", "source" => p.source().to_string())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        (p.source().to_string(), res)
    });

    let mut report = IngestReport::default();
    for (source, res) in join_all(fetches).await {
        match res {
            Ok(mut articles) => {
                counter!("ingest_articles_total", "source" => source.clone())
                    .increment(articles.len() as u64);
                report.outcomes.push(SourceOutcome {
                    source,
                    articles: articles.len(),
                    error: None,
                });
                report.articles.append(&mut articles);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = %source, "feed fetch failed");
                counter!("ingest_source_errors_total", "source" => source.clone()).increment(1);
                report.outcomes.push(SourceOutcome {
                    source,
                    articles: 0,
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    tracing::info!(
        target: "ingest",
        articles = report.articles.len(),
        sources = report.outcomes.len(),
        failed = report.failed_sources().len(),
        "ingest run finished"
    );
    report
}
