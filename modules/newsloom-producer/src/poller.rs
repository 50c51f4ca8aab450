use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use newsloom_common::{Article, UNCATEGORIZED_FEED};

use crate::dedup::DedupCache;
use crate::extract::BodyExtractor;
use crate::feeds::{FeedEntry, FeedFetcher};
use crate::publisher::ArticleSink;

/// How a single feed entry resolved within one poll. Isolation between
/// entries is explicit control flow, not a surrounding catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Published,
    Skipped,
    Failed,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PollStats {
    pub feeds_polled: usize,
    pub feeds_failed: usize,
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Polls the configured feeds and publishes unseen articles to the sink.
/// Owns its dedup cache; nothing here is ambient state.
pub struct FeedPoller {
    feed_urls: Vec<String>,
    fetcher: FeedFetcher,
    extractor: BodyExtractor,
    sink: Arc<dyn ArticleSink>,
    cache: DedupCache,
}

impl FeedPoller {
    pub fn new(feed_urls: Vec<String>, sink: Arc<dyn ArticleSink>) -> Self {
        Self {
            feed_urls,
            fetcher: FeedFetcher::new(),
            extractor: BodyExtractor::new(),
            sink,
            cache: DedupCache::new(),
        }
    }

    /// One pass over every configured feed. A feed failure is logged and
    /// skips only that feed; entry failures are counted per entry.
    pub async fn poll_once(&mut self) -> PollStats {
        let mut stats = PollStats::default();
        let feed_urls = self.feed_urls.clone();

        for feed_url in &feed_urls {
            match self.fetcher.fetch(feed_url).await {
                Ok(entries) => {
                    stats.feeds_polled += 1;
                    for entry in entries {
                        match self.process_entry(entry).await {
                            EntryOutcome::Published => stats.published += 1,
                            EntryOutcome::Skipped => stats.skipped += 1,
                            EntryOutcome::Failed => stats.failed += 1,
                        }
                    }
                }
                Err(e) => {
                    stats.feeds_failed += 1;
                    warn!(feed = feed_url.as_str(), error = %e, "Failed to fetch feed");
                }
            }
        }

        info!(
            published = stats.published,
            skipped = stats.skipped,
            failed = stats.failed,
            feeds_failed = stats.feeds_failed,
            "poll complete"
        );
        stats
    }

    async fn process_entry(&mut self, entry: FeedEntry) -> EntryOutcome {
        if self.cache.seen(&entry.url) {
            return EntryOutcome::Skipped;
        }

        // Body fetch failure degrades to an empty body, never drops the entry.
        let content = self.extractor.fetch_body(&entry.url).await;

        let article = Article {
            title: entry.title,
            writer_raw: entry.author.unwrap_or_else(|| "unknown".to_string()),
            write_date: entry.published.unwrap_or_else(Utc::now),
            category: entry
                .category
                .unwrap_or_else(|| UNCATEGORIZED_FEED.to_string()),
            content,
            url: entry.url,
            keywords: Vec::new(),
            embedding: None,
        };

        match self.sink.publish(&article).await {
            Ok(()) => {
                self.cache.mark(&article.url);
                info!(url = %article.url, title = %article.title, "article published");
                EntryOutcome::Published
            }
            Err(e) => {
                warn!(url = %article.url, error = %e, "Failed to publish article");
                EntryOutcome::Failed
            }
        }
    }
}
