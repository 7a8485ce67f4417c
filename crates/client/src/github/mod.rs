//! GitHub issue search client.
//!
//! ### API contract
//!
//! - **Endpoint**: `GET {base}/search/issues`
//! - **Authentication**: optional bearer token; anonymous search has a much
//!   lower rate limit.
//! - **Rate limiting**: 429, or 403 with an exhausted `x-ratelimit-remaining`
//!   or a rate-limit message, maps to `GithubError::RateLimited`. No retries.
//! - **Normalization**: the response is reduced to a `SearchPage`.

pub mod error;
pub mod request;
pub mod response;

pub use error::{GithubError, RATE_LIMIT_MESSAGE, is_rate_limit_message};
pub use request::{SearchIssuesRequest, build_query};
pub use response::{Issue, IssueLabel, IssueUser, Reactions, SearchPage, SearchIssuesResponse};

use async_trait::async_trait;
use gfi_core::{AppConfig, SearchFilters};
use reqwest::{StatusCode, header};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default base URL for the GitHub REST API.
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent. GitHub rejects requests without one.
const DEFAULT_USER_AGENT: &str = "good-first-issues/0.1";

const API_VERSION: &str = "2022-11-28";

/// Anything that can answer a filtered issue search.
#[async_trait]
pub trait IssueProvider: Send + Sync {
    async fn search(&self, filters: &SearchFilters) -> Result<SearchPage, GithubError>;
}

/// GitHub client configuration.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Optional personal access token.
    pub token: Option<String>,
    /// Base URL (default: https://api.github.com).
    pub base_url: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&AppConfig> for GithubConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            token: config.github_token.clone().filter(|t| !t.is_empty()),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// GitHub search API client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GithubError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Run one issue search.
    pub async fn search_issues(&self, req: &SearchIssuesRequest) -> Result<SearchPage, GithubError> {
        let start = Instant::now();
        let url = format!("{}/search/issues", self.config.base_url);

        tracing::debug!("searching GitHub issues: q={} page={}", req.q, req.page);

        let mut request = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(req);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let http_response = request.send().await?;

        let status = http_response.status();
        tracing::debug!("GitHub API response status: {}", status);

        if !status.is_success() {
            let remaining = http_response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = http_response.text().await.unwrap_or_default();
            return Err(classify_status(status, remaining.as_deref(), &body));
        }

        let bytes = http_response.bytes().await?;
        let raw: SearchIssuesResponse =
            serde_json::from_slice(&bytes).map_err(|e| GithubError::Parse(e.to_string()))?;

        tracing::debug!(
            "search completed in {:?}, {} of {} results",
            start.elapsed(),
            raw.items.len(),
            raw.total_count
        );

        Ok(raw.into())
    }
}

#[async_trait]
impl IssueProvider for GithubClient {
    async fn search(&self, filters: &SearchFilters) -> Result<SearchPage, GithubError> {
        self.search_issues(&SearchIssuesRequest::from_filters(filters)).await
    }
}

/// Map a non-success response to an error.
fn classify_status(status: StatusCode, ratelimit_remaining: Option<&str>, body: &str) -> GithubError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        return GithubError::RateLimited(message);
    }

    if status == StatusCode::FORBIDDEN && (ratelimit_remaining == Some("0") || is_rate_limit_message(&message)) {
        return GithubError::RateLimited(message);
    }

    if status == StatusCode::UNAUTHORIZED {
        return GithubError::AuthError(message);
    }

    GithubError::HttpError { status: status.as_u16(), message }
}
