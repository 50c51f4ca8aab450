pub mod error;

pub use error::{Result, SearchError};

use std::time::Duration;

use tracing::debug;

/// Client for an Elasticsearch-compatible document index. Upserts are
/// expressed through the `_update` endpoint with `doc_as_upsert`, so a
/// repeat write to the same document id converges instead of duplicating.
pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    index: String,
}

impl SearchClient {
    pub fn new(base_url: &str, index: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build search HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        }
    }

    /// Upsert a document under the given id.
    pub async fn upsert_doc(&self, id: i64, doc: &serde_json::Value) -> Result<()> {
        let endpoint = format!("{}/{}/_update/{}", self.base_url, self.index, id);

        let body = serde_json::json!({
            "doc": doc,
            "doc_as_upsert": true,
        });

        debug!(index = %self.index, id, "search: upserting document");

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
