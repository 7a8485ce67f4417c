//! Client code for good-first-issues.
//!
//! This crate provides the GitHub search client, the cached issue finder and
//! share-link helpers used by the server.

pub mod finder;
pub mod github;
pub mod share;

pub use finder::{FindOutcome, IssueFinder};
pub use github::{
    GithubClient, GithubConfig, GithubError, Issue, IssueLabel, IssueProvider, IssueUser, RATE_LIMIT_MESSAGE,
    SearchIssuesRequest, SearchPage, build_query,
};
pub use share::{FILTERS_PARAM, filters_from_url, share_url, share_url_str};
