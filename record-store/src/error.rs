//! Error types for record-store operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("remote file not found: {path}")]
    NotFound { path: String },

    #[error("revision conflict writing {path}")]
    Conflict { path: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("remote API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("content decode error: {0}")]
    Base64(#[from] contents_types::DecodeError),

    #[error("unsupported content encoding: {0:?}")]
    UnsupportedEncoding(String),

    #[error("{path} has not been loaded, refusing to overwrite it")]
    NotLoaded { path: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("additional info may not set reserved field {0:?}")]
    ReservedField(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
