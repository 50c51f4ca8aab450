use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use newsloom_common::{EnrichedArticle, NewsloomError};
use search_client::SearchClient;

use crate::store::PgStore;

// --- Sink seams ---

/// The relational source of truth; assigns the cross-sink identity.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn upsert(&self, article: &EnrichedArticle) -> Result<i64>;
}

/// The search index; documents are keyed by the relational identity so
/// corrective re-indexing converges on the same document.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn upsert_doc(&self, id: i64, doc: &serde_json::Value) -> Result<()>;
}

/// The append-only keyword log.
#[async_trait]
pub trait KeywordLog: Send + Sync {
    async fn append(&self, record: &LogRecord) -> Result<()>;
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn upsert(&self, article: &EnrichedArticle) -> Result<i64> {
        PgStore::upsert(self, article).await
    }
}

#[async_trait]
impl DocumentIndex for SearchClient {
    async fn upsert_doc(&self, id: i64, doc: &serde_json::Value) -> Result<()> {
        SearchClient::upsert_doc(self, id, doc).await?;
        Ok(())
    }
}

// --- Records ---

/// One line of the append-only log, consumed later by the batch
/// aggregation job.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub write_date: DateTime<Utc>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct CommitOutcome {
    pub assigned_id: i64,
    pub log_appended: bool,
}

/// Search document for an enriched article. The embedding stays out of the
/// index; absent vectors are a relational-store concern.
pub fn index_doc(id: i64, article: &EnrichedArticle) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": article.title,
        "content": article.content,
        "writer": article.writer,
        "category": article.category,
        "write_date": format!("{}+00:00", article.write_date.format("%Y-%m-%dT%H:%M:%S")),
        "keywords": article.keywords,
        "url": article.url,
        "views": 0,
    })
}

// --- Coordinator ---

/// Lands one enriched record in all three sinks, in fixed order: the
/// relational store first (it is the identity authority), the search index
/// second (its document id is that identity), the log last. Failures in the
/// first two are hard: the record is reported failed and the caller must
/// not advance past it. A log failure after the writer's bounded retries is
/// soft: logged, the record still counts as processed.
pub struct Committer {
    store: Arc<dyn IdentityStore>,
    index: Arc<dyn DocumentIndex>,
    log: Arc<dyn KeywordLog>,
}

impl Committer {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        index: Arc<dyn DocumentIndex>,
        log: Arc<dyn KeywordLog>,
    ) -> Self {
        Self { store, index, log }
    }

    pub async fn commit(
        &self,
        article: &EnrichedArticle,
    ) -> Result<CommitOutcome, NewsloomError> {
        let assigned_id = self
            .store
            .upsert(article)
            .await
            .map_err(|e| NewsloomError::Store(e.to_string()))?;

        let doc = index_doc(assigned_id, article);
        self.index
            .upsert_doc(assigned_id, &doc)
            .await
            .map_err(|e| NewsloomError::Index(e.to_string()))?;

        let record = LogRecord {
            write_date: article.write_date,
            keywords: article.keywords.clone(),
        };
        let log_appended = match self.log.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(url = %article.url, error = %e, "keyword log append failed; record still committed");
                false
            }
        };

        info!(url = %article.url, assigned_id, log_appended, "article committed");
        Ok(CommitOutcome {
            assigned_id,
            log_appended,
        })
    }
}
