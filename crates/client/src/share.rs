//! Shareable links carrying the filter token.
//!
//! The token lives in a single `filters` query parameter. Writing a new token
//! replaces the parameter in place and keeps every other parameter.

use gfi_core::SearchFilters;
use url::Url;

/// Query parameter holding the filter token.
pub const FILTERS_PARAM: &str = "filters";

/// Return `base` with its `filters` parameter set to the token for `filters`.
///
/// Default filters remove the parameter entirely.
pub fn share_url(base: &Url, filters: &SearchFilters) -> Url {
    let token = filters.to_token();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(name, _)| name != FILTERS_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    if kept.is_empty() && token.is_empty() {
        return url;
    }

    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &kept {
            pairs.append_pair(name, value);
        }
        if !token.is_empty() {
            pairs.append_pair(FILTERS_PARAM, &token);
        }
    }
    url
}

/// Parse `base` and build a share link on it.
///
/// # Errors
///
/// Returns `gfi_core::Error::InvalidInput` if `base` is not an absolute URL.
pub fn share_url_str(base: &str, filters: &SearchFilters) -> Result<Url, gfi_core::Error> {
    let base = Url::parse(base).map_err(|e| gfi_core::Error::InvalidInput(format!("invalid share base URL: {}", e)))?;
    Ok(share_url(&base, filters))
}

/// Read the filters encoded in a link, or defaults if there are none.
pub fn filters_from_url(url: &Url) -> SearchFilters {
    url.query_pairs()
        .filter(|(name, _)| name == FILTERS_PARAM)
        .last()
        .map(|(_, token)| SearchFilters::from_token(&token))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://gfi.example.com/?theme=dark&filters=p:9").unwrap()
    }

    #[test]
    fn test_share_url_replaces_param() {
        let filters = SearchFilters::default().with_language("C++").with_page(2);
        let url = share_url(&base(), &filters);

        let filters_params: Vec<_> = url.query_pairs().filter(|(n, _)| n == FILTERS_PARAM).collect();
        assert_eq!(filters_params.len(), 1);
        assert_eq!(filters_params[0].1, "l:C%2B%2B+p:2");
        assert!(url.query_pairs().any(|(n, v)| n == "theme" && v == "dark"));
    }

    #[test]
    fn test_share_url_roundtrip() {
        let filters = SearchFilters::default().with_language("Jupyter Notebook").with_language("C#").with_page(4);
        let url = share_url(&base(), &filters);
        assert_eq!(filters_from_url(&url), filters);
    }

    #[test]
    fn test_default_filters_drop_param() {
        let url = share_url(&base(), &SearchFilters::default());
        assert_eq!(url.as_str(), "https://gfi.example.com/?theme=dark");

        let bare = share_url(&Url::parse("https://gfi.example.com/").unwrap(), &SearchFilters::default());
        assert_eq!(bare.as_str(), "https://gfi.example.com/");
    }

    #[test]
    fn test_filters_from_url_without_param() {
        let url = Url::parse("https://gfi.example.com/?theme=dark").unwrap();
        assert_eq!(filters_from_url(&url), SearchFilters::default());
    }

    #[test]
    fn test_share_url_str_rejects_relative() {
        assert!(share_url_str("/issues", &SearchFilters::default()).is_err());
        assert!(share_url_str("https://gfi.example.com", &SearchFilters::default()).is_ok());
    }
}
