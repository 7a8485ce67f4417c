//! GitHub search client error types.

use std::sync::Arc;

/// Message shown to users when the search API rate limit is hit.
pub const RATE_LIMIT_MESSAGE: &str =
    "You've hit the GitHub API rate limit. This resets after an hour. Please come back later.";

/// Errors from the GitHub search client.
///
/// `Clone` so that one failed request can be handed to every caller that
/// joined it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GithubError {
    /// Rate limited by the GitHub API.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed (invalid or expired token).
    #[error("authentication failed: {0}")]
    AuthError(String),

    /// HTTP error response.
    #[error("HTTP error: {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// The background search task panicked or was aborted.
    #[error("search task failed: {0}")]
    TaskFailed(String),

    /// The request could not be described or keyed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { GithubError::Timeout } else { GithubError::Network(Arc::new(err)) }
    }
}

impl GithubError {
    /// Whether this failure means the caller is being rate limited.
    ///
    /// Besides the dedicated variant, any error whose message mentions a rate
    /// limit, a 403, "too many requests" or "exceeded" counts.
    pub fn is_rate_limited(&self) -> bool {
        if matches!(self, GithubError::RateLimited(_)) {
            return true;
        }
        is_rate_limit_message(&self.to_string())
    }

    /// Text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        if self.is_rate_limited() { RATE_LIMIT_MESSAGE.to_string() } else { self.to_string() }
    }
}

/// Classify a raw error message as a rate-limit condition.
pub fn is_rate_limit_message(message: &str) -> bool {
    let message = message.to_lowercase();
    ["rate limit", "403", "too many requests", "exceeded"]
        .iter()
        .any(|needle| message.contains(needle))
}

impl From<GithubError> for gfi_core::Error {
    fn from(err: GithubError) -> Self {
        match err {
            e if e.is_rate_limited() => gfi_core::Error::GithubRateLimited(e.user_message()),
            GithubError::AuthError(msg) => gfi_core::Error::GithubAuthError(msg),
            GithubError::InvalidRequest(msg) => gfi_core::Error::InvalidInput(msg),
            GithubError::HttpError { status, message } => {
                gfi_core::Error::HttpError(format!("HTTP {}: {}", status, message))
            }
            e => gfi_core::Error::HttpError(e.to_string()),
        }
    }
}
