use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

/// One candidate article as reported by a feed, before the body fetch.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build feed HTTP client");
        Self { client }
    }

    /// Fetch and parse an RSS/Atom feed, returning entries oldest-to-newest
    /// so publish order follows publication order.
    pub async fn fetch(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        let resp = self
            .client
            .get(feed_url)
            .header("User-Agent", "newsloom-producer/0.1")
            .send()
            .await
            .context("feed fetch failed")?;

        let bytes = resp.bytes().await.context("failed to read feed body")?;
        let feed = feed_rs::parser::parse(&bytes[..]).context("failed to parse RSS/Atom feed")?;

        let entries = map_entries(feed);
        info!(feed_url, entries = entries.len(), "feed: parsed successfully");
        Ok(entries)
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds list newest-first; reverse so the oldest entry publishes first.
fn map_entries(feed: feed_rs::model::Feed) -> Vec<FeedEntry> {
    let mut entries: Vec<FeedEntry> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

            Some(FeedEntry {
                url,
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                author: entry
                    .authors
                    .first()
                    .map(|a| a.name.clone())
                    .filter(|n| !n.is_empty()),
                published: entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.with_timezone(&Utc)),
                category: entry
                    .categories
                    .first()
                    .map(|c| c.term.clone())
                    .filter(|t| !t.is_empty()),
            })
        })
        .collect();

    entries.reverse();
    entries
}
