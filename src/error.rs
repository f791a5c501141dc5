//! Failure kinds raised inside the dispatch chain.
//!
//! # Design Decisions
//! - `Error::Http` is the handled failure: it carries a status and a plaintext
//!   message and is always turned into a response at the dispatch boundary
//! - Every other variant is unhandled and is returned to the caller of `dispatch`

use axum::http::header::{InvalidHeaderName, InvalidHeaderValue};
use axum::http::StatusCode;

/// Boxed error accepted from application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raised on purpose to answer with a specific status.
    #[error("{message}")]
    Http { message: String, status: StatusCode },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other failure coming out of a handler or middleware.
    #[error(transparent)]
    Unhandled(BoxError),
}

impl Error {
    /// Wrap an arbitrary error as an unhandled failure.
    pub fn unhandled(err: impl Into<BoxError>) -> Self {
        Error::Unhandled(err.into())
    }

    /// True for failures that dispatch translates into a response.
    pub fn is_handled(&self) -> bool {
        matches!(self, Error::Http { .. })
    }
}

impl From<InvalidHeaderName> for Error {
    fn from(err: InvalidHeaderName) -> Self {
        Error::InvalidHeader(err.to_string())
    }
}

impl From<InvalidHeaderValue> for Error {
    fn from(err: InvalidHeaderValue) -> Self {
        Error::InvalidHeader(err.to_string())
    }
}

/// Build a handled failure carrying `message` and `status`.
pub fn create_error(message: impl Into<String>, status: StatusCode) -> Error {
    Error::Http {
        message: message.into(),
        status,
    }
}
