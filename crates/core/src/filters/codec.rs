//! Compact, URL-friendly filter tokens.
//!
//! A token is a `+`-joined list of `key:value` segments, one per field that
//! differs from its default:
//!
//! | key  | field      | value                         |
//! |------|------------|-------------------------------|
//! | `l`  | languages  | names joined by `,`           |
//! | `d`  | date range | `<from>,<to>`, either may be empty |
//! | `s`  | sort_by    | `created`, `updated`, ...     |
//! | `o`  | sort_order | `asc` or `desc`               |
//! | `p`  | page       | decimal                       |
//! | `pp` | per_page   | decimal                       |
//!
//! Decoding is total: unknown keys are skipped and a value that does not parse
//! leaves its field at the default.

use chrono::NaiveDate;

use super::{DEFAULT_PAGE, DEFAULT_PER_PAGE, DateRange, SearchFilters, SortBy, SortOrder};

const SEGMENT_SEP: char = '+';
const KEY_SEP: char = ':';
const LIST_SEP: char = ',';

const KEY_LANGUAGES: &str = "l";
const KEY_DATE_RANGE: &str = "d";
const KEY_SORT_BY: &str = "s";
const KEY_SORT_ORDER: &str = "o";
const KEY_PAGE: &str = "p";
const KEY_PER_PAGE: &str = "pp";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Encode filters as a token. Default filters encode to `""`.
pub fn serialize(filters: &SearchFilters) -> String {
    let mut segments: Vec<String> = Vec::new();

    if !filters.languages.is_empty() {
        let names: Vec<String> = filters.languages.iter().map(|l| escape(l)).collect();
        segments.push(segment(KEY_LANGUAGES, &names.join(&LIST_SEP.to_string())));
    }

    let DateRange { from, to } = filters.date_range;
    if from.is_some() || to.is_some() {
        let from = from.map(format_date).unwrap_or_default();
        let to = to.map(format_date).unwrap_or_default();
        segments.push(segment(KEY_DATE_RANGE, &format!("{from}{LIST_SEP}{to}")));
    }

    if filters.sort_by != SortBy::default() {
        segments.push(segment(KEY_SORT_BY, filters.sort_by.as_str()));
    }

    if filters.sort_order != SortOrder::default() {
        segments.push(segment(KEY_SORT_ORDER, filters.sort_order.as_str()));
    }

    if filters.page != DEFAULT_PAGE {
        segments.push(segment(KEY_PAGE, &filters.page.to_string()));
    }

    if filters.per_page != DEFAULT_PER_PAGE {
        segments.push(segment(KEY_PER_PAGE, &filters.per_page.to_string()));
    }

    segments.join(&SEGMENT_SEP.to_string())
}

/// Decode a token. Never fails: anything unusable falls back to defaults.
pub fn deserialize(token: &str) -> SearchFilters {
    let mut filters = SearchFilters::default();

    for part in token.split(SEGMENT_SEP) {
        let Some((key, value)) = part.split_once(KEY_SEP) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        match key {
            KEY_LANGUAGES => filters.languages = decode_languages(value),
            KEY_DATE_RANGE => filters.date_range = decode_date_range(value),
            KEY_SORT_BY => filters.sort_by = value.parse().unwrap_or_default(),
            KEY_SORT_ORDER => filters.sort_order = value.parse().unwrap_or_default(),
            KEY_PAGE => filters.page = decode_positive(value, DEFAULT_PAGE),
            KEY_PER_PAGE => filters.per_page = decode_positive(value, DEFAULT_PER_PAGE),
            other => tracing::trace!(key = other, "ignoring unknown filter segment"),
        }
    }

    filters
}

fn segment(key: &str, value: &str) -> String {
    format!("{key}{KEY_SEP}{value}")
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn decode_languages(value: &str) -> Vec<String> {
    value
        .split(LIST_SEP)
        .filter(|name| !name.is_empty())
        .map(unescape)
        .collect()
}

fn decode_date_range(value: &str) -> DateRange {
    let (from, to) = value.split_once(LIST_SEP).unwrap_or((value, ""));
    DateRange { from: decode_date(from), to: decode_date(to) }
}

/// An empty bound is "no date", distinct from any parsed date.
fn decode_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn decode_positive(value: &str, default: u32) -> u32 {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => default,
    }
}

/// Percent-escape the separator characters (and `%` itself) in a value.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '+' => out.push_str("%2B"),
            ',' => out.push_str("%2C"),
            ':' => out.push_str("%3A"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape`]. Unrecognised escapes are kept verbatim.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        let decoded = match tail.get(..3) {
            Some("%25") => Some('%'),
            Some("%2B") | Some("%2b") => Some('+'),
            Some("%2C") | Some("%2c") => Some(','),
            Some("%3A") | Some("%3a") => Some(':'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
