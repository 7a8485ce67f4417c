//! MCP tool implementations.
//!
//! This module contains all tools exposed by the good-first-issues server.

pub mod cache;
pub mod find_issues;

pub use find_issues::FindIssuesParams;

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use gfi_client::{GithubError, Issue, IssueProvider, SearchPage};
    use gfi_core::SearchFilters;
    use rmcp::model::CallToolResult;

    const ISSUE_JSON: &str = r#"{
        "id": 101,
        "number": 7,
        "title": "Add a --quiet flag",
        "html_url": "https://github.com/acme/widgets/issues/7",
        "state": "open",
        "comments": 3,
        "created_at": "2024-03-02T10:00:00Z",
        "updated_at": "2024-03-05T12:30:00Z",
        "user": {"login": "octocat"},
        "labels": [{"name": "good first issue"}],
        "repository_url": "https://api.github.com/repos/acme/widgets"
    }"#;

    /// Provider returning one fixed issue, or a rate-limit error.
    #[derive(Default)]
    pub(crate) struct StubProvider {
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl IssueProvider for StubProvider {
        async fn search(&self, _filters: &SearchFilters) -> Result<SearchPage, GithubError> {
            if self.fail {
                return Err(GithubError::RateLimited("API rate limit exceeded".into()));
            }
            let issue: Issue = serde_json::from_str(ISSUE_JSON).map_err(|e| GithubError::Parse(e.to_string()))?;
            Ok(SearchPage { items: vec![issue], total_count: 61 })
        }
    }

    /// Text of the first content block of a tool result.
    pub(crate) fn output_text(result: &CallToolResult) -> String {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content")
            .to_string()
    }
}
