use std::sync::{Arc, LazyLock};

use proptest::prelude::*;

use lexicon::LexiconError;
use lexicon::query::{LimitPolicy, NegativeCache, QueryLimits, is_acceptable};
use lexicon::service::{DictionaryService, SearchParams};
use lexicon::test_utils::fixtures::DictionaryFixture;

static FIXTURE: LazyLock<DictionaryFixture> = LazyLock::new(DictionaryFixture::new);

static SERVICE: LazyLock<DictionaryService> = LazyLock::new(|| {
    DictionaryService::new(Arc::new(FIXTURE.open())).with_cache(NegativeCache::disabled())
});

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_search_result_counts_are_consistent(
        searchable in "[αβγδεθλνοπρστωΑΛ]{1,8}",
        exact in any::<bool>(),
        case_sensitive in any::<bool>(),
        limit in 1u64..10,
        offset in proptest::option::of(0u64..8),
    ) {
        let params = SearchParams {
            searchable: searchable.clone(),
            fields: Some("uri,word".to_string()),
            exact,
            case_sensitive,
            limit: Some(limit),
            offset,
        };

        match SERVICE.search(&params) {
            Ok(Some(result)) => {
                prop_assert_eq!(result.count, result.definitions.len());
                prop_assert!(result.count_all >= result.count as u64);
                prop_assert!(result.count as u64 <= limit);
                for row in &result.definitions {
                    prop_assert!(!row.contains_key("orderedID"));
                    prop_assert!(!row.contains_key("countAll"));
                }
            }
            Ok(None) => prop_assert!(is_acceptable(&searchable)),
            Err(err) => {
                prop_assert!(!is_acceptable(&searchable));
                prop_assert!(matches!(err, LexiconError::UnacceptableSearch(_)));
            }
        }
    }

    #[test]
    fn test_prefix_matches_share_prefix(searchable in "[αλ][ανθγορω]{0,4}") {
        let params = SearchParams {
            fields: Some("searchableCaseInsensitive".to_string()),
            limit: Some(10),
            ..SearchParams::new(searchable.clone())
        };

        if let Ok(Some(result)) = SERVICE.search(&params) {
            for row in &result.definitions {
                let value = row["searchableCaseInsensitive"].as_str().unwrap_or_default();
                prop_assert!(value.starts_with(&searchable), "{value} !~ {searchable}");
            }
        }
    }

    #[test]
    fn test_clamp_never_exceeds_maximum(max_rows in 1u64..5000, requested in 1u64..100_000) {
        let limits = QueryLimits { max_rows, policy: LimitPolicy::Clamp };
        let resolved = limits.resolve(Some(requested)).unwrap();
        prop_assert_eq!(resolved, requested.min(max_rows));
    }

    #[test]
    fn test_reject_is_all_or_nothing(max_rows in 1u64..5000, requested in 1u64..10_000) {
        let limits = QueryLimits { max_rows, policy: LimitPolicy::Reject };
        match limits.resolve(Some(requested)) {
            Ok(resolved) => prop_assert_eq!(resolved, requested),
            Err(_) => prop_assert!(requested > max_rows),
        }
    }
}
