//! find_issues tool implementation.
//!
//! Resolves a filter token plus optional overrides into `SearchFilters`, then
//! runs a cached GitHub issue search.

use chrono::{NaiveDate, Utc};
use gfi_client::{IssueFinder, IssueProvider, share_url_str};
use gfi_core::{DatePreset, DateRange, Error, SearchFilters, SessionStore, SortBy, SortOrder, SortPreset};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GitHub serves at most 100 results per page.
const MAX_PER_PAGE: u32 = 100;

/// Input parameters for find_issues tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FindIssuesParams {
    /// Filter token from a previous result or share link (e.g. "l:Rust+s:comments").
    #[serde(default)]
    pub filters: Option<String>,

    /// Replace the language list.
    #[serde(default)]
    pub languages: Option<Vec<String>>,

    /// Named creation-date range (today, yesterday, this-week, last-week,
    /// this-month, last-month, this-year). `from`/`to` override its bounds.
    #[serde(default)]
    pub date_preset: Option<DatePreset>,

    /// Earliest creation date, YYYY-MM-DD. An empty string clears the bound.
    #[serde(default)]
    pub from: Option<String>,

    /// Latest creation date, YYYY-MM-DD. An empty string clears the bound.
    #[serde(default)]
    pub to: Option<String>,

    /// Named sort (oldest, latest, most-comments, least-comments).
    /// `sort_by`/`sort_order` override its parts.
    #[serde(default)]
    pub sort_preset: Option<SortPreset>,

    /// Sort field: created (default), updated, comments, reactions.
    #[serde(default)]
    pub sort_by: Option<SortBy>,

    /// Sort direction: asc or desc (default).
    #[serde(default)]
    pub sort_order: Option<SortOrder>,

    /// Page number, starting at 1.
    #[serde(default)]
    pub page: Option<u32>,

    /// Results per page (1-100, default 30).
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Output structure for find_issues tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindIssuesOutput {
    /// Issues on this page.
    pub items: Vec<IssueSummary>,
    /// Total number of matching issues.
    pub total_count: u64,
    /// Number of pages at the current page size.
    pub total_pages: u64,
    /// Current page.
    pub page: u32,
    /// Current page size.
    pub per_page: u32,
    /// Named sort matching `sort_by`/`sort_order`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_preset: Option<SortPreset>,
    /// Canonical filter token for these results.
    pub filters: String,
    /// Shareable link, when a share base URL is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    /// Whether the results came from the cache.
    pub cache_hit: bool,
}

/// Condensed issue record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssueSummary {
    pub title: String,
    pub url: String,
    /// `owner/name` of the repository.
    pub repository: String,
    pub number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub labels: Vec<String>,
    pub comments: u64,
    pub reactions: u64,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl From<&gfi_client::Issue> for IssueSummary {
    fn from(issue: &gfi_client::Issue) -> Self {
        Self {
            title: issue.title.clone(),
            url: issue.html_url.clone(),
            repository: issue.repository_name().to_string(),
            number: issue.number,
            author: issue.user.as_ref().map(|u| u.login.clone()),
            labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
            comments: issue.comments,
            reactions: issue.reaction_count(),
            created_at: issue.created_at.to_rfc3339(),
        }
    }
}

/// Build the effective filters: token first, then presets, then explicit
/// overrides. Date presets resolve against `today`.
pub fn resolve_filters(params: &FindIssuesParams, today: NaiveDate) -> Result<SearchFilters, Error> {
    let mut filters = params
        .filters
        .as_deref()
        .map(SearchFilters::from_token)
        .unwrap_or_default();

    if let Some(languages) = &params.languages {
        let cleared = SearchFilters { languages: Vec::new(), ..filters.clone() };
        filters = languages.iter().fold(cleared, |acc, name| acc.with_language(name));
    }

    if let Some(preset) = params.date_preset {
        filters = filters.with_date_range(preset.range(today))?;
    }

    if params.from.is_some() || params.to.is_some() {
        let from = match &params.from {
            Some(raw) => parse_date("from", raw)?,
            None => filters.date_range.from,
        };
        let to = match &params.to {
            Some(raw) => parse_date("to", raw)?,
            None => filters.date_range.to,
        };
        filters = filters.with_date_range(DateRange::new(from, to)?)?;
    }

    if let Some(preset) = params.sort_preset {
        filters = filters.with_sort(preset);
    }
    if let Some(sort_by) = params.sort_by {
        filters.sort_by = sort_by;
    }
    if let Some(sort_order) = params.sort_order {
        filters.sort_order = sort_order;
    }

    if let Some(per_page) = params.per_page {
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(Error::InvalidInput(format!("per_page must be 1-{}", MAX_PER_PAGE)));
        }
        filters.per_page = per_page;
    }

    if let Some(page) = params.page {
        if page == 0 {
            return Err(Error::InvalidInput("page must be at least 1".into()));
        }
        filters.page = page;
    }

    Ok(filters)
}

fn parse_date(field: &str, raw: &str) -> Result<Option<NaiveDate>, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("invalid {} date {:?}: {}", field, raw, e)))
}

/// Implementation of the find_issues tool.
pub async fn find_impl<P, S>(
    finder: &IssueFinder<P, S>, share_base_url: Option<&str>, params: FindIssuesParams,
) -> Result<CallToolResult, McpError>
where
    P: IssueProvider + 'static,
    S: SessionStore + 'static,
{
    let filters = resolve_filters(&params, Utc::now().date_naive())?;

    let outcome = finder.find(&filters).await.map_err(|e| {
        tracing::warn!("issue search failed: {}", e);
        Error::from(e)
    })?;

    let share_url = match share_base_url {
        Some(base) => Some(share_url_str(base, &filters)?.to_string()),
        None => None,
    };

    let output = FindIssuesOutput {
        items: outcome.page.items.iter().map(IssueSummary::from).collect(),
        total_count: outcome.page.total_count,
        total_pages: filters.total_pages(outcome.page.total_count),
        page: filters.page,
        per_page: filters.per_page,
        sort_preset: SortPreset::matching(&filters),
        filters: filters.to_token(),
        share_url,
        cache_hit: outcome.cache_hit,
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
