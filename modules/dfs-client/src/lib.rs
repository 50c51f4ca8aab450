pub mod error;

pub use error::{DfsError, Result};

use std::time::Duration;

use tracing::debug;

/// Client for a WebHDFS-compatible REST endpoint.
///
/// The store allows one active writer lease per file; `create` is
/// write-once (`overwrite=false`) and `append` extends an existing file.
/// Lease contention surfaces as an API error from either call; retry
/// policy belongs to the caller. The namenode answers data operations with
/// a 307 redirect to a datanode; the underlying HTTP client follows it,
/// replaying method and body.
pub struct DfsClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
}

impl DfsClient {
    pub fn new(base_url: &str, user: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build DFS HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
        }
    }

    fn op_url(&self, path: &str, op: &str) -> String {
        format!(
            "{}/webhdfs/v1{}?op={}&user.name={}",
            self.base_url, path, op, self.user
        )
    }

    /// Probe whether a path exists. A missing path is not an error.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        let resp = self
            .client
            .get(self.op_url(path, "GETFILESTATUS"))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }

        let message = resp.text().await.unwrap_or_default();
        Err(DfsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Create a directory (and any missing parents).
    pub async fn mkdirs(&self, path: &str) -> Result<()> {
        debug!(path, "dfs: mkdirs");
        let resp = self
            .client
            .put(self.op_url(path, "MKDIRS"))
            .send()
            .await?;
        Self::check(resp).await
    }

    /// Create a new file with the given content. Fails if the file exists.
    pub async fn create(&self, path: &str, data: &[u8]) -> Result<()> {
        debug!(path, bytes = data.len(), "dfs: create");
        let url = format!("{}&overwrite=false", self.op_url(path, "CREATE"));
        let resp = self.client.put(url).body(data.to_vec()).send().await?;
        Self::check(resp).await
    }

    /// Append content to an existing file.
    pub async fn append(&self, path: &str, data: &[u8]) -> Result<()> {
        debug!(path, bytes = data.len(), "dfs: append");
        let resp = self
            .client
            .post(self.op_url(path, "APPEND"))
            .body(data.to_vec())
            .send()
            .await?;
        Self::check(resp).await
    }

    async fn check(resp: reqwest::Response) -> Result<()> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = resp.text().await.unwrap_or_default();
        Err(DfsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn exists_distinguishes_present_and_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/webhdfs/v1/user/newsloom/articles.json"))
            .and(query_param("op", "GETFILESTATUS"))
            .and(query_param("user.name", "newsloom"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "FileStatus": {"type": "FILE", "length": 10}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/webhdfs/v1/user/newsloom/missing.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("FileNotFoundException"))
            .mount(&server)
            .await;

        let client = DfsClient::new(&server.uri(), "newsloom");
        assert!(client.exists("/user/newsloom/articles.json").await.unwrap());
        assert!(!client.exists("/user/newsloom/missing.json").await.unwrap());
    }

    #[tokio::test]
    async fn append_posts_body_with_append_op() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhdfs/v1/user/newsloom/articles.json"))
            .and(query_param("op", "APPEND"))
            .and(body_bytes(b"line\n".to_vec()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = DfsClient::new(&server.uri(), "newsloom");
        client
            .append("/user/newsloom/articles.json", b"line\n")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_follows_namenode_redirect() {
        let server = MockServer::start().await;
        let datanode_url = format!("{}/datanode/user/newsloom/articles.json", server.uri());
        Mock::given(method("PUT"))
            .and(path("/webhdfs/v1/user/newsloom/articles.json"))
            .and(query_param("op", "CREATE"))
            .and(query_param("overwrite", "false"))
            .respond_with(
                ResponseTemplate::new(307).insert_header("Location", datanode_url.as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/datanode/user/newsloom/articles.json"))
            .and(body_bytes(b"first\n".to_vec()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = DfsClient::new(&server.uri(), "newsloom");
        client
            .create("/user/newsloom/articles.json", b"first\n")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn lease_conflict_surfaces_as_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhdfs/v1/user/newsloom/articles.json"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_string("AlreadyBeingCreatedException: lease held"),
            )
            .mount(&server)
            .await;

        let client = DfsClient::new(&server.uri(), "newsloom");
        let err = client
            .append("/user/newsloom/articles.json", b"line\n")
            .await
            .unwrap_err();
        match err {
            DfsError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("lease"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
