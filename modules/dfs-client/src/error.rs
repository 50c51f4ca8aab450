use thiserror::Error;

pub type Result<T> = std::result::Result<T, DfsError>;

#[derive(Debug, Error)]
pub enum DfsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for DfsError {
    fn from(err: reqwest::Error) -> Self {
        DfsError::Network(err.to_string())
    }
}
