//! Unified error types for good-first-issues.
//!
//! Each variant carries a stable code prefix in its display form so that
//! tool callers can match on it.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types shared by the core, client and server crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a malformed date override).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A date range edit would put `from` after `to`.
    #[error("INVALID_DATE_RANGE: {from} is after {to}")]
    InvalidDateRange { from: chrono::NaiveDate, to: chrono::NaiveDate },

    /// Session store operation failed.
    #[error("CACHE_ERROR: {0}")]
    Storage(String),

    /// Session store database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A value could not be serialized or deserialized.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),

    /// GitHub API rate limited.
    #[error("GITHUB_RATE_LIMITED: {0}")]
    GithubRateLimited(String),

    /// GitHub API authentication error.
    #[error("GITHUB_AUTH_ERROR: {0}")]
    GithubAuthError(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidDateRange { .. } => (-32602, err.to_string()),
            Error::Storage(msg) => (-32002, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::Serialization(e) => (-32003, e.to_string()),
            Error::GithubRateLimited(msg) => (-32010, msg.clone()),
            Error::GithubAuthError(msg) => (-32009, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
