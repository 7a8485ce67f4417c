//! GitHub issue search response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<Issue>,
    pub total_count: u64,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Raw response body of `GET /search/issues`.
#[derive(Debug, Deserialize)]
pub struct SearchIssuesResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<Issue>,
}

impl From<SearchIssuesResponse> for SearchPage {
    fn from(raw: SearchIssuesResponse) -> Self {
        if raw.incomplete_results {
            tracing::debug!(total_count = raw.total_count, "GitHub returned incomplete search results");
        }
        SearchPage { items: raw.items, total_count: raw.total_count }
    }
}

/// The subset of an issue record the tool uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<IssueUser>,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub repository_url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub reactions: Option<Reactions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueUser {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLabel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    pub total_count: u64,
}

impl Issue {
    /// `owner/name` taken from the last two segments of `repository_url`.
    pub fn repository_name(&self) -> &str {
        let trimmed = self.repository_url.trim_end_matches('/');
        let mut slashes = trimmed.rmatch_indices('/').map(|(idx, _)| idx);
        match (slashes.next(), slashes.next()) {
            (Some(_), Some(start)) => &trimmed[start + 1..],
            _ => trimmed,
        }
    }

    pub fn reaction_count(&self) -> u64 {
        self.reactions.as_ref().map(|r| r.total_count).unwrap_or(0)
    }
}
