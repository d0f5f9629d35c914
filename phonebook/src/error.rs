//! Error types for phonebook commands.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("record-store error: {0}")]
    Store(#[from] record_store::Error),

    #[error("{0}")]
    Usage(String),

    #[error("invalid additional info {0:?}, expected key=value")]
    InvalidInfo(String),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Json(#[from] serde_json::Error),
}
