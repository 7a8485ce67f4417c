//! GitHub issue search request construction.

use gfi_core::{DateRange, SearchFilters};
use serde::Serialize;

/// Qualifiers every search carries.
pub const BASE_QUERY: &str = r#"is:issue is:open label:"good first issue""#;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query parameters for `GET /search/issues`.
///
/// Based on the GitHub REST API documentation:
/// https://docs.github.com/en/rest/search/search#search-issues-and-pull-requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchIssuesRequest {
    /// Search query with qualifiers.
    pub q: String,

    /// Sort field (created, updated, comments, reactions).
    pub sort: &'static str,

    /// Sort direction (asc, desc).
    pub order: &'static str,

    /// Results per page (max 100).
    pub per_page: u32,

    /// Page number (1-indexed).
    pub page: u32,

    /// Opt into the advanced issue search syntax.
    pub advanced_search: bool,
}

impl SearchIssuesRequest {
    pub fn from_filters(filters: &SearchFilters) -> Self {
        Self {
            q: build_query(filters),
            sort: filters.sort_by.as_str(),
            order: filters.sort_order.as_str(),
            per_page: filters.per_page,
            page: filters.page,
            advanced_search: true,
        }
    }
}

/// Build the search expression for a set of filters.
///
/// Languages are OR-combined inside one group; the creation-date qualifier is
/// `created:A..B`, or an open-ended `created:>=A` / `created:<=B`.
pub fn build_query(filters: &SearchFilters) -> String {
    let mut query = String::from(BASE_QUERY);

    let languages: Vec<String> = filters
        .languages
        .iter()
        .map(|lang| lang.replace('"', ""))
        .filter(|lang| !lang.trim().is_empty())
        .map(|lang| format!("language:\"{}\"", lang))
        .collect();
    if !languages.is_empty() {
        query.push_str(&format!(" ({})", languages.join(" OR ")));
    }

    if let Some(created) = created_qualifier(&filters.date_range) {
        query.push(' ');
        query.push_str(&created);
    }

    query
}

fn created_qualifier(range: &DateRange) -> Option<String> {
    let from = range.from.map(|d| d.format(DATE_FORMAT).to_string());
    let to = range.to.map(|d| d.format(DATE_FORMAT).to_string());
    match (from, to) {
        (Some(from), Some(to)) => Some(format!("created:{}..{}", from, to)),
        (Some(from), None) => Some(format!("created:>={}", from)),
        (None, Some(to)) => Some(format!("created:<={}", to)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gfi_core::{SortBy, SortOrder};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_query() {
        assert_eq!(build_query(&SearchFilters::default()), r#"is:issue is:open label:"good first issue""#);
    }

    #[test]
    fn test_languages_are_or_combined() {
        let filters = SearchFilters::default().with_language("Rust").with_language("C++");
        assert_eq!(
            build_query(&filters),
            r#"is:issue is:open label:"good first issue" (language:"Rust" OR language:"C++")"#
        );
    }

    #[test]
    fn test_quotes_stripped_from_languages() {
        let filters = SearchFilters { languages: vec![r#"Ru"st"#.into(), "\"".into()], ..Default::default() };
        assert!(build_query(&filters).ends_with(r#"(language:"Rust")"#));
    }

    #[test]
    fn test_closed_date_range() {
        let filters = SearchFilters {
            date_range: DateRange { from: Some(date(2024, 1, 1)), to: Some(date(2024, 1, 31)) },
            ..Default::default()
        };
        assert!(build_query(&filters).ends_with(" created:2024-01-01..2024-01-31"));
    }

    #[test]
    fn test_open_ended_ranges() {
        let from_only = SearchFilters {
            date_range: DateRange { from: Some(date(2024, 3, 1)), to: None },
            ..Default::default()
        };
        assert!(build_query(&from_only).ends_with(" created:>=2024-03-01"));

        let to_only = SearchFilters {
            date_range: DateRange { from: None, to: Some(date(2024, 2, 1)) },
            ..Default::default()
        };
        assert!(build_query(&to_only).ends_with(" created:<=2024-02-01"));
    }

    #[test]
    fn test_request_from_filters() {
        let filters = SearchFilters {
            sort_by: SortBy::Reactions,
            sort_order: SortOrder::Asc,
            page: 3,
            per_page: 50,
            ..Default::default()
        };
        let req = SearchIssuesRequest::from_filters(&filters);
        assert_eq!(req.sort, "reactions");
        assert_eq!(req.order, "asc");
        assert_eq!(req.page, 3);
        assert_eq!(req.per_page, 50);
        assert!(req.advanced_search);
    }

    #[test]
    fn test_request_query_serialization() {
        let req = SearchIssuesRequest::from_filters(&SearchFilters::default());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["sort"], "created");
        assert_eq!(value["order"], "desc");
        assert_eq!(value["per_page"], 30);
        assert_eq!(value["page"], 1);
        assert_eq!(value["advanced_search"], true);
    }
}
