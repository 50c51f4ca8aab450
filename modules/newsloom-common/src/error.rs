use thiserror::Error;

/// Failure taxonomy for the commit path. Store and index failures are hard
/// (the consumer must not advance past the record); a log-sink failure is
/// soft (logged, the record still counts as processed).
#[derive(Error, Debug)]
pub enum NewsloomError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Log sink error: {0}")]
    LogSink(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
