pub mod config;
pub mod embedding;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::NewsloomError;
pub use types::*;
