//! Typed errors shared by the client layers.

use thiserror::Error;

/// Failures of the chatbot exchange.
///
/// Every variant carries plain strings so a `ChatEvent::Error` can be cloned
/// and compared in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("session creation failed: {0}")]
    Session(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    #[error("Response body is not readable: {0}")]
    Unreadable(String),

    #[error("stream cancelled")]
    Cancelled,
}

/// Failures of the bill/meeting REST backend.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Failures of the local key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("bill {0} has already been voted on from this device")]
    AlreadyVoted(i64),

    #[error("vote was not accepted: {0}")]
    Backend(#[from] ApiError),
}
