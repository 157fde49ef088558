// src/ingest/providers/rss.rs
//! RSS 2.0 and Atom feed provider.
//!
//! Entries become [`Article`]s in document order. Missing or unparseable
//! dates fall back to the fetch time; the article id is
//! `"{source}-{guid|id|link}"`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::types::FeedProvider;
use crate::ingest::{normalize_text, MAX_HEADLINE_CHARS, MAX_SUMMARY_CHARS};
use crate::model::Article;

/* ----------------------------
RSS 2.0
---------------------------- */

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<TextNode>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/* ----------------------------
Atom
---------------------------- */

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<TextNode>,
    #[serde(default)]
    link: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Element whose attributes we ignore, e.g. `<guid isPermaLink="false">`.
#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Parse an RFC 2822 (RSS) or RFC 3339 (Atom) timestamp.
pub fn parse_feed_date(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    let odt = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(&replace_named_zone(ts), &Rfc2822))
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()?;
    DateTime::from_timestamp(odt.unix_timestamp(), odt.nanosecond())
}

/// Some feeds still write `GMT`/`UTC`/`UT` zones.
fn replace_named_zone(ts: &str) -> String {
    for zone in [" GMT", " UTC", " UT", " Z"] {
        if let Some(head) = ts.strip_suffix(zone) {
            return format!("{head} +0000");
        }
    }
    ts.to_string()
}

/// Feeds occasionally carry HTML entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&pound;", "£")
        .replace("&hellip;", "...")
}

struct RawEntry {
    id: Option<String>,
    link: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    date: Option<String>,
}

impl RawEntry {
    fn into_article(self, source: &str, fetched_at: DateTime<Utc>) -> Article {
        let url = self.link.map(|s| s.trim().to_string()).unwrap_or_default();
        let entry_id = self
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| url.clone());
        let published_at = self
            .date
            .as_deref()
            .and_then(parse_feed_date)
            .unwrap_or(fetched_at);

        Article::new(
            source,
            &entry_id,
            normalize_text(self.title.as_deref().unwrap_or_default(), MAX_HEADLINE_CHARS),
            published_at,
        )
        .with_summary(normalize_text(
            self.summary.as_deref().unwrap_or_default(),
            MAX_SUMMARY_CHARS,
        ))
        .with_url(url)
    }
}

fn rss_entries(xml: &str) -> Result<Vec<RawEntry>> {
    let rss: Rss = from_str(xml).context("parsing rss xml")?;
    Ok(rss
        .channel
        .item
        .into_iter()
        .map(|it| RawEntry {
            id: it.guid.map(|g| g.value),
            link: it.link,
            title: it.title,
            summary: it.description,
            date: it.pub_date,
        })
        .collect())
}

fn atom_entries(xml: &str) -> Result<Vec<RawEntry>> {
    let feed: AtomFeed = from_str(xml).context("parsing atom xml")?;
    Ok(feed
        .entry
        .into_iter()
        .map(|e| {
            let link = e
                .link
                .iter()
                .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                .or_else(|| e.link.first())
                .and_then(|l| l.href.clone());
            RawEntry {
                id: e.id,
                link,
                title: e.title.map(|t| t.value),
                summary: e.summary.map(|t| t.value),
                date: e.published.or(e.updated),
            }
        })
        .collect())
}

fn looks_like_atom(xml: &str) -> bool {
    match (xml.find("<feed"), xml.find("<rss")) {
        (Some(f), Some(r)) => f < r,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Parse a feed document into articles for `source`.
pub fn parse_feed(source: &str, xml: &str, fetched_at: DateTime<Utc>) -> Result<Vec<Article>> {
    let xml = scrub_html_entities_for_xml(xml);
    let entries = if looks_like_atom(&xml) {
        atom_entries(&xml)?
    } else {
        rss_entries(&xml)?
    };
    Ok(entries
        .into_iter()
        .map(|e| e.into_article(source, fetched_at))
        .collect())
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

pub struct RssProvider {
    source: String,
    mode: Mode,
}

impl RssProvider {
    /// Serve a fixed document; used by tests and offline runs.
    pub fn from_fixture(source: &str, content: &str) -> Self {
        Self {
            source: source.to_string(),
            mode: Mode::Fixture(content.to_string()),
        }
    }

    pub fn from_url(source: &str, url: &str, client: reqwest::Client) -> Self {
        Self {
            source: source.to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }
}

#[async_trait]
impl FeedProvider for RssProvider {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let fetched_at = Utc::now();
        match &self.mode {
            Mode::Fixture(s) => parse_feed(&self.source, s, fetched_at),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{} http get {}", self.source, url))?;
                if !resp.status().is_success() {
                    return Err(anyhow!("{} feed returned {}", self.source, resp.status()));
                }
                let body = resp
                    .text()
                    .await
                    .with_context(|| format!("{} http body", self.source))?;
                parse_feed(&self.source, &body, fetched_at)
            }
        }
    }

    fn source(&self) -> &str {
        &self.source
    }
}
