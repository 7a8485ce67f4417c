//! Search filter model.
//!
//! A `SearchFilters` value is never edited in place: every edit method takes
//! `&self` and returns a complete new value, with `page` reset to 1 whenever
//! the result set changes.

pub mod codec;
pub mod presets;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

pub use codec::{deserialize, serialize};
pub use presets::{DatePreset, SortPreset};

/// Default page number (1-indexed).
pub const DEFAULT_PAGE: u32 = 1;

/// Default number of results per page.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Field used to order search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Created,
    Updated,
    Comments,
    Reactions,
}

impl SortBy {
    pub const ALL: [SortBy; 4] = [SortBy::Created, SortBy::Updated, SortBy::Comments, SortBy::Reactions];

    /// Literal tag used in tokens and API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Created => "created",
            SortBy::Updated => "updated",
            SortBy::Comments => "comments",
            SortBy::Reactions => "reactions",
        }
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown sort field: {s}")))
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::InvalidInput(format!("unknown sort order: {other}"))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation-date bounds, both inclusive and both optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range, rejecting `from > to`.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, Error> {
        let range = Self { from, to };
        range.check_order()?;
        Ok(range)
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    fn check_order(&self) -> Result<(), Error> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(Error::InvalidDateRange { from, to }),
            _ => Ok(()),
        }
    }
}

/// The complete filter state for one search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchFilters {
    pub languages: Vec<String>,
    pub date_range: DateRange,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub page: u32,
    pub per_page: u32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            date_range: DateRange::default(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl SearchFilters {
    /// Decode a filter token. See [`codec::deserialize`].
    pub fn from_token(token: &str) -> Self {
        deserialize(token)
    }

    /// Encode as a filter token. See [`codec::serialize`].
    pub fn to_token(&self) -> String {
        serialize(self)
    }

    /// Add a language. Blank names and names already present are ignored.
    pub fn with_language(&self, name: &str) -> Self {
        let name = name.trim();
        let mut next = self.clone();
        if !name.is_empty() && !next.languages.iter().any(|l| l == name) {
            next.languages.push(name.to_string());
            next.page = DEFAULT_PAGE;
        }
        next
    }

    pub fn without_language(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.languages.retain(|l| l != name);
        next.page = DEFAULT_PAGE;
        next
    }

    /// Set or clear the lower date bound.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDateRange` if the new bound is after `to`.
    pub fn with_date_from(&self, from: Option<NaiveDate>) -> Result<Self, Error> {
        self.with_date_range(DateRange { from, to: self.date_range.to })
    }

    /// Set or clear the upper date bound.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDateRange` if the new bound is before `from`.
    pub fn with_date_to(&self, to: Option<NaiveDate>) -> Result<Self, Error> {
        self.with_date_range(DateRange { from: self.date_range.from, to })
    }

    pub fn with_date_range(&self, range: DateRange) -> Result<Self, Error> {
        range.check_order()?;
        Ok(Self { date_range: range, page: DEFAULT_PAGE, ..self.clone() })
    }

    pub fn cleared_dates(&self) -> Self {
        Self { date_range: DateRange::default(), page: DEFAULT_PAGE, ..self.clone() }
    }

    pub fn with_sort(&self, preset: SortPreset) -> Self {
        let (sort_by, sort_order) = preset.sort();
        Self { sort_by, sort_order, page: DEFAULT_PAGE, ..self.clone() }
    }

    /// Jump to a page; 0 is treated as the first page.
    pub fn with_page(&self, page: u32) -> Self {
        Self { page: page.max(DEFAULT_PAGE), ..self.clone() }
    }

    /// Number of pages needed to show `total_count` results.
    pub fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(u64::from(self.per_page.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let filters = SearchFilters::default();
        assert!(filters.languages.is_empty());
        assert!(filters.date_range.is_empty());
        assert_eq!(filters.sort_by, SortBy::Created);
        assert_eq!(filters.sort_order, SortOrder::Desc);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.per_page, 30);
    }

    #[test]
    fn test_with_language_trims_and_dedups() {
        let filters = SearchFilters::default().with_page(4).with_language("  Rust ");
        assert_eq!(filters.languages, vec!["Rust"]);
        assert_eq!(filters.page, 1);

        let again = filters.with_page(3).with_language("Rust");
        assert_eq!(again.languages, vec!["Rust"]);
        assert_eq!(again.page, 3);

        let blank = filters.with_language("   ");
        assert_eq!(blank, filters);
    }

    #[test]
    fn test_without_language() {
        let filters = SearchFilters::default().with_language("Rust").with_language("Go").with_page(2);
        let next = filters.without_language("Rust");
        assert_eq!(next.languages, vec!["Go"]);
        assert_eq!(next.page, 1);
        // the original value is untouched
        assert_eq!(filters.languages, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_date_bounds_enforce_order() {
        let filters = SearchFilters::default().with_date_from(Some(date(2024, 3, 1))).unwrap();

        let err = filters.with_date_to(Some(date(2024, 2, 1))).unwrap_err();
        assert!(matches!(err, Error::InvalidDateRange { .. }));

        let ok = filters.with_date_to(Some(date(2024, 3, 1))).unwrap();
        assert_eq!(ok.date_range, DateRange { from: Some(date(2024, 3, 1)), to: Some(date(2024, 3, 1)) });

        let err = ok.with_date_from(Some(date(2024, 4, 1))).unwrap_err();
        assert!(matches!(err, Error::InvalidDateRange { .. }));
    }

    #[test]
    fn test_clearing_a_bound_always_succeeds() {
        let filters = SearchFilters::default()
            .with_date_range(DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31))).unwrap())
            .unwrap();
        let cleared = filters.with_date_from(None).unwrap();
        assert_eq!(cleared.date_range.from, None);
        assert_eq!(cleared.date_range.to, Some(date(2024, 1, 31)));
        assert!(cleared.cleared_dates().date_range.is_empty());
    }

    #[test]
    fn test_with_sort_preset() {
        let filters = SearchFilters::default().with_page(5).with_sort(SortPreset::LeastComments);
        assert_eq!(filters.sort_by, SortBy::Comments);
        assert_eq!(filters.sort_order, SortOrder::Asc);
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_with_page_zero_clamps() {
        assert_eq!(SearchFilters::default().with_page(0).page, 1);
    }

    #[test]
    fn test_total_pages() {
        let filters = SearchFilters::default();
        assert_eq!(filters.total_pages(0), 0);
        assert_eq!(filters.total_pages(30), 1);
        assert_eq!(filters.total_pages(31), 2);
    }

    #[test]
    fn test_enum_tags() {
        assert_eq!("reactions".parse::<SortBy>().unwrap(), SortBy::Reactions);
        assert!("votes".parse::<SortBy>().is_err());
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("ASC".parse::<SortOrder>().is_err());
        assert_eq!(SortBy::Updated.to_string(), "updated");
    }
}
