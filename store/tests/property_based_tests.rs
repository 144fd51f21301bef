use proptest::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use store::cache::{CacheEntry, CacheKey, TtlCache};
use store::model::Scope;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Insert(String, i64),
    Invalidate(String),
    InvalidatePrefix(String),
    Clear,
}

fn setting_name() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

fn cache_op() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (setting_name(), any::<i64>()).prop_map(|(key, value)| CacheOp::Insert(key, value)),
        2 => setting_name().prop_map(CacheOp::Invalidate),
        1 => setting_name().prop_map(CacheOp::InvalidatePrefix),
        1 => Just(CacheOp::Clear),
    ]
}

#[cfg(test)]
mod cache_property_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_cache_matches_reference_map(ops in prop::collection::vec(cache_op(), 0..40)) {
            let rt = runtime();
            let cache = TtlCache::new(Duration::from_secs(3600));
            let mut model: HashMap<String, i64> = HashMap::new();

            rt.block_on(async {
                for op in &ops {
                    match op {
                        CacheOp::Insert(name, value) => {
                            let key = CacheKey::setting(name, None);
                            cache.insert(&key, json!(value)).await;
                            model.insert(key, *value);
                        }
                        CacheOp::Invalidate(name) => {
                            let key = CacheKey::setting(name, None);
                            cache.invalidate(&key).await;
                            model.remove(&key);
                        }
                        CacheOp::InvalidatePrefix(name) => {
                            let prefix = CacheKey::setting_prefix(name);
                            cache.invalidate_prefix(&prefix).await;
                            model.retain(|key, _| !key.starts_with(&prefix));
                        }
                        CacheOp::Clear => {
                            cache.clear().await;
                            model.clear();
                        }
                    }
                }
            });

            // Property: every modelled key is fresh with the last written value
            let snapshot = rt.block_on(cache.snapshot());
            prop_assert_eq!(snapshot.len(), model.len());
            for (key, value) in &model {
                let cached = rt.block_on(cache.get_fresh(key));
                prop_assert_eq!(cached, Some(json!(value)));
            }

            let stats = rt.block_on(cache.stats());
            prop_assert_eq!(stats.entries, model.len());
            prop_assert_eq!(stats.stale_entries, 0);
        }

        #[test]
        fn test_invalidated_ticket_never_populates(
            name in setting_name(),
            scope_index in 0usize..3,
            clear_instead in any::<bool>()
        ) {
            let rt = runtime();
            let cache = TtlCache::new(Duration::from_secs(3600));
            let scope = [Scope::Default, Scope::Store, Scope::User][scope_index];
            let key = CacheKey::setting(&name, Some(scope));

            let populated = rt.block_on(async {
                let ticket = cache.begin_fetch(&key).await;
                if clear_instead {
                    cache.clear().await;
                } else {
                    cache.invalidate_prefix(&CacheKey::setting_prefix(&name)).await;
                }
                cache.complete_fetch(ticket, json!("late")).await
            });

            // Property: a response started before invalidation is discarded
            prop_assert!(!populated);
            prop_assert!(rt.block_on(cache.get_stale(&key)).is_none());
        }

        #[test]
        fn test_persisted_entries_round_trip_through_json(
            names in prop::collection::hash_set(setting_name(), 0..10),
            ttl_secs in 0u64..600
        ) {
            let entries: HashMap<String, CacheEntry> = names
                .iter()
                .map(|name| (CacheKey::setting(name, None), CacheEntry::new(json!(name))))
                .collect();
            let raw = serde_json::to_string(&entries).unwrap();
            let restored: HashMap<String, CacheEntry> = serde_json::from_str(&raw).unwrap();

            // Property: persisted timestamps keep millisecond precision
            prop_assert_eq!(restored.len(), entries.len());
            for (key, entry) in &entries {
                let back = &restored[key];
                prop_assert_eq!(&back.value, &entry.value);
                prop_assert_eq!(
                    back.timestamp.timestamp_millis(),
                    entry.timestamp.timestamp_millis()
                );
            }

            // Property: a restored cache serves every entry as stale at least
            let rt = runtime();
            let cache = TtlCache::with_entries(Duration::from_secs(ttl_secs), restored);
            for key in entries.keys() {
                prop_assert!(rt.block_on(cache.get_stale(key)).is_some());
            }
        }
    }
}
