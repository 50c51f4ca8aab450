use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use dfs_client::DfsClient;
use newsloom_common::NewsloomError;

use crate::sinks::{KeywordLog, LogRecord};

/// Bound on write attempts per record.
pub const LOG_MAX_ATTEMPTS: u32 = 3;

/// Pause after a successful write while the store releases the lease.
const DEFAULT_POST_WRITE_PAUSE: Duration = Duration::from_secs(2);
/// Pause before retrying a failed write.
const DEFAULT_RETRY_PAUSE: Duration = Duration::from_secs(3);

/// File-store surface the log writer needs; [`DfsClient`] in production.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool>;
    async fn mkdirs(&self, path: &str) -> Result<()>;
    async fn create(&self, path: &str, data: &[u8]) -> Result<()>;
    async fn append(&self, path: &str, data: &[u8]) -> Result<()>;
}

#[async_trait]
impl LogStore for DfsClient {
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(DfsClient::exists(self, path).await?)
    }

    async fn mkdirs(&self, path: &str) -> Result<()> {
        Ok(DfsClient::mkdirs(self, path).await?)
    }

    async fn create(&self, path: &str, data: &[u8]) -> Result<()> {
        Ok(DfsClient::create(self, path, data).await?)
    }

    async fn append(&self, path: &str, data: &[u8]) -> Result<()> {
        Ok(DfsClient::append(self, path, data).await?)
    }
}

/// Appends line-delimited records to a single-lease log file.
///
/// The store admits one writer lease per file, and a prior writer's lease
/// can linger for a bounded grace period after its write. Each append
/// probes the path, picks append-vs-create, and retries up to
/// [`LOG_MAX_ATTEMPTS`] times with pauses tuned to observed lease-release
/// latency. Attempts are serialized per writer: concurrent appenders would
/// both fight over the lease and interleave partial lines.
pub struct LogWriter {
    store: Arc<dyn LogStore>,
    path: String,
    post_write_pause: Duration,
    retry_pause: Duration,
    write_lock: Mutex<()>,
}

impl LogWriter {
    pub fn new(store: Arc<dyn LogStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
            post_write_pause: DEFAULT_POST_WRITE_PAUSE,
            retry_pause: DEFAULT_RETRY_PAUSE,
            write_lock: Mutex::new(()),
        }
    }

    /// Override the lease pauses (empirical defaults, not load-bearing).
    pub fn with_pauses(mut self, post_write_pause: Duration, retry_pause: Duration) -> Self {
        self.post_write_pause = post_write_pause;
        self.retry_pause = retry_pause;
        self
    }

    async fn append_line(&self, record: &LogRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut line = serde_json::to_vec(record).context("encoding log record")?;
        line.push(b'\n');

        if let Some((parent, _)) = self.path.rsplit_once('/') {
            if !parent.is_empty() && !self.store.exists(parent).await? {
                self.store.mkdirs(parent).await?;
                debug!(dir = parent, "log: created parent directory");
            }
        }

        let file_exists = self.store.exists(&self.path).await?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = if file_exists {
                self.store.append(&self.path, &line).await
            } else {
                self.store.create(&self.path, &line).await
            };

            match result {
                Ok(()) => {
                    // Give the store time to release the write lease before
                    // the next record arrives.
                    tokio::time::sleep(self.post_write_pause).await;
                    debug!(path = self.path.as_str(), attempt, "log: record appended");
                    return Ok(());
                }
                Err(e) if attempt < LOG_MAX_ATTEMPTS => {
                    warn!(
                        path = self.path.as_str(),
                        attempt,
                        max_attempts = LOG_MAX_ATTEMPTS,
                        error = %e,
                        "log: write failed, retrying"
                    );
                    tokio::time::sleep(self.retry_pause).await;
                }
                Err(e) => {
                    return Err(NewsloomError::LogSink(format!(
                        "giving up after {LOG_MAX_ATTEMPTS} attempts: {e}"
                    ))
                    .into())
                }
            }
        }
    }
}

#[async_trait]
impl KeywordLog for LogWriter {
    async fn append(&self, record: &LogRecord) -> Result<()> {
        self.append_line(record).await
    }
}
