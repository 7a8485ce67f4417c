use chrono::NaiveDate;
use gfi_core::filters::{deserialize, serialize};
use gfi_core::{DateRange, MemoryStore, ResultCache, SearchFilters, SortBy, SortOrder, fingerprint};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of((1970_i32..2100, 1_u32..=12, 1_u32..=28).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d).expect("day 1-28 exists in every month")
    }))
}

fn arb_language() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec!["Rust", "C++", "C#", "F#", "Jupyter Notebook", "Objective-C", "Go"])
            .prop_map(String::from),
        "[A-Za-z0-9+#:,% .-]{0,10}[A-Za-z0-9+#:,%.-]",
    ]
    .prop_map(|name| name.trim().to_string())
    .prop_filter("language names are never blank", |name| !name.is_empty())
}

prop_compose! {
    fn arb_filters()(
        languages in prop::collection::vec(arb_language(), 0..4),
        from in arb_date(),
        to in arb_date(),
        sort_by in prop::sample::select(SortBy::ALL.to_vec()),
        asc in any::<bool>(),
        page in 1_u32..500,
        per_page in 1_u32..=100,
    ) -> SearchFilters {
        let (from, to) = match (from, to) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            other => other,
        };
        SearchFilters {
            languages,
            date_range: DateRange { from, to },
            sort_by,
            sort_order: if asc { SortOrder::Asc } else { SortOrder::Desc },
            page,
            per_page,
        }
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn token_roundtrip(filters in arb_filters()) {
        let token = serialize(&filters);
        prop_assert_eq!(deserialize(&token), filters);
    }

    #[test]
    fn serialize_is_deterministic(filters in arb_filters()) {
        prop_assert_eq!(serialize(&filters), serialize(&filters.clone()));
    }

    #[test]
    fn deserialize_never_panics(token in "[a-z:,+%0-9-]{0,40}") {
        let filters = deserialize(&token);
        prop_assert!(filters.page >= 1);
        prop_assert!(filters.per_page >= 1);
    }

    #[test]
    fn segment_order_is_irrelevant(filters in arb_filters()) {
        let token = serialize(&filters);
        let reversed: Vec<&str> = token.split('+').rev().collect();
        prop_assert_eq!(deserialize(&reversed.join("+")), filters);
    }

    #[test]
    fn equal_filters_share_a_key(filters in arb_filters()) {
        let mut rebuilt = SearchFilters::default();
        rebuilt.per_page = filters.per_page;
        rebuilt.page = filters.page;
        rebuilt.sort_order = filters.sort_order;
        rebuilt.sort_by = filters.sort_by;
        rebuilt.date_range = filters.date_range;
        rebuilt.languages = filters.languages.clone();

        prop_assert_eq!(fingerprint(&filters).unwrap(), fingerprint(&rebuilt).unwrap());
    }
}

#[test]
fn default_filters_encode_to_empty_token() {
    assert_eq!(serialize(&SearchFilters::default()), "");
    assert_eq!(deserialize("z:garbage"), SearchFilters::default());
}

#[tokio::test]
async fn end_to_end_scenario() {
    let filters = SearchFilters {
        languages: vec!["Rust".into()],
        date_range: DateRange { from: NaiveDate::from_ymd_opt(2024, 3, 1), to: None },
        sort_by: SortBy::Comments,
        sort_order: SortOrder::Asc,
        page: 2,
        per_page: 30,
    };

    let decoded = deserialize(&serialize(&filters));
    assert_eq!(decoded, filters);

    let mut reassigned = SearchFilters { languages: vec!["Go".into()], ..filters.clone() };
    reassigned.languages = vec!["Rust".into()];
    assert_eq!(fingerprint(&filters).unwrap(), fingerprint(&reassigned).unwrap());

    let mut cache: ResultCache<u64, _> = ResultCache::new(MemoryStore::new()).await;
    cache.set(&filters, 42);
    assert_eq!(cache.get(&reassigned), Some(42));
    assert_eq!(cache.get(&decoded), Some(42));
}
