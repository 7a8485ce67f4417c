//! Named sort and date-range shortcuts.

use chrono::{Datelike, Days, Months, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{DateRange, SearchFilters, SortBy, SortOrder};

/// A named (sort field, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortPreset {
    Oldest,
    Latest,
    MostComments,
    LeastComments,
}

impl SortPreset {
    pub const ALL: [SortPreset; 4] =
        [SortPreset::Oldest, SortPreset::Latest, SortPreset::MostComments, SortPreset::LeastComments];

    pub fn sort(&self) -> (SortBy, SortOrder) {
        match self {
            SortPreset::Oldest => (SortBy::Created, SortOrder::Asc),
            SortPreset::Latest => (SortBy::Created, SortOrder::Desc),
            SortPreset::MostComments => (SortBy::Comments, SortOrder::Desc),
            SortPreset::LeastComments => (SortBy::Comments, SortOrder::Asc),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortPreset::Oldest => "Oldest",
            SortPreset::Latest => "Latest",
            SortPreset::MostComments => "Most Comments",
            SortPreset::LeastComments => "Least Comments",
        }
    }

    /// The preset describing the current sort, if there is one.
    pub fn matching(filters: &SearchFilters) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.sort() == (filters.sort_by, filters.sort_order))
    }
}

/// A date range relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DatePreset {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
}

impl DatePreset {
    pub const ALL: [DatePreset; 7] = [
        DatePreset::Today,
        DatePreset::Yesterday,
        DatePreset::ThisWeek,
        DatePreset::LastWeek,
        DatePreset::ThisMonth,
        DatePreset::LastMonth,
        DatePreset::ThisYear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::Yesterday => "Yesterday",
            DatePreset::ThisWeek => "This Week",
            DatePreset::LastWeek => "Last Week",
            DatePreset::ThisMonth => "This Month",
            DatePreset::LastMonth => "Last Month",
            DatePreset::ThisYear => "This Year",
        }
    }

    /// Resolve against `today`. Weeks run Sunday to Saturday.
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let (from, to) = match self {
            DatePreset::Today => (today, today),
            DatePreset::Yesterday => {
                let day = today.pred_opt().unwrap_or(today);
                (day, day)
            }
            DatePreset::ThisWeek => week_of(today),
            DatePreset::LastWeek => week_of(today.checked_sub_days(Days::new(7)).unwrap_or(today)),
            DatePreset::ThisMonth => month_of(today),
            DatePreset::LastMonth => month_of(today.checked_sub_months(Months::new(1)).unwrap_or(today)),
            DatePreset::ThisYear => (today.with_ordinal(1).unwrap_or(today), today),
        };
        DateRange { from: Some(from), to: Some(to) }
    }
}

fn week_of(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(day.weekday().num_days_from_sunday());
    let start = day.checked_sub_days(Days::new(offset)).unwrap_or(day);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    (start, end)
}

fn month_of(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (start, end)
}
