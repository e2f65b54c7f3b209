use thiserror::Error;

/// Core error type shared across condmask crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The record collection does not have the expected shape.
    #[error("invalid records: {0}")]
    InvalidRecords(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by condmask crates.
pub type Result<T> = std::result::Result<T, Error>;
