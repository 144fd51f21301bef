use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store::common::{ConfigError, HttpError};
use store::config_store::{
    CachedConfigStore, ConfigStore, ConfigStoreExt, ConfigTransport, RemoteConfigStore,
};
use store::model::{PartialThemeConfig, Scope, ThemeMode};
use store::storage::{FileStorage, KeyValueStorage, MemoryStorage};

const CACHE_KEY: &str = "tillcfg.config-cache.v1";

// Helper module for the backend double
mod backend {
    use super::*;

    /// Backend that answers GETs by path and can be unplugged.
    #[derive(Default)]
    pub struct Backend {
        pub bodies: Mutex<HashMap<String, Value>>,
        pub offline: AtomicBool,
        pub gets: AtomicU32,
        pub puts: AtomicU32,
    }

    impl Backend {
        pub fn serve(&self, path: &str, body: Value) {
            self.bodies.lock().unwrap().insert(path.to_string(), body);
        }

        pub fn unplug(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        pub fn gets(&self) -> u32 {
            self.gets.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConfigTransport for Backend {
        async fn get(&self, path: &str, _query: &[(&'static str, String)]) -> Result<Value, HttpError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(HttpError::RequestFailed {
                    url: path.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            self.bodies
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or(HttpError::NotFound {
                    url: path.to_string(),
                })
        }

        async fn put(&self, path: &str, _body: Value) -> Result<Value, HttpError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(HttpError::RequestFailed {
                    url: path.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        }
    }

    pub fn chain(
        backend: &Arc<Backend>,
        storage: Arc<dyn KeyValueStorage>,
        ttl: Duration,
    ) -> CachedConfigStore {
        let remote = RemoteConfigStore::new(backend.clone(), ttl);
        CachedConfigStore::new(Arc::new(remote), storage, CACHE_KEY, ttl)
    }
}

use backend::*;

mod offline_fallback {
    use super::*;

    #[tokio::test]
    async fn test_stale_tax_rate_served_when_network_fails() {
        let backend = Arc::new(Backend::default());
        backend.serve("/settings/tax_rate", json!({ "value": 0.08, "scope": "store" }));
        let store = chain(&backend, Arc::new(MemoryStorage::new()), Duration::ZERO);

        let first = store.get_setting_as::<f64>("tax_rate", None).await.unwrap();
        assert_eq!(first.value, 0.08);

        backend.unplug();
        let offline = store.get_setting_as::<f64>("tax_rate", None).await.unwrap();
        assert_eq!(offline.value, 0.08);
        assert_eq!(offline.scope, Scope::Store);
    }

    #[tokio::test]
    async fn test_remote_alone_propagates_failure() {
        let backend = Arc::new(Backend::default());
        backend.serve("/settings/tax_rate", json!({ "value": 0.08, "scope": "store" }));
        let remote = RemoteConfigStore::new(backend.clone(), Duration::ZERO);

        remote.get_setting("tax_rate", None).await.unwrap();
        backend.unplug();

        let err = remote.get_setting("tax_rate", None).await.unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Network(HttpError::RequestFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_key_offline_surfaces_error() {
        let backend = Arc::new(Backend::default());
        backend.unplug();
        let store = chain(&backend, Arc::new(MemoryStorage::new()), Duration::from_secs(60));

        let err = store.get_setting("currency", None).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_file_backed_cache_serves_next_process() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = Arc::new(Backend::default());
        backend.serve("/theme", json!({ "mode": "dark", "colors": { "accent": "#ff6600" } }));

        {
            let storage = Arc::new(FileStorage::new(tmp.path()));
            let store = chain(&backend, storage, Duration::from_secs(60));
            store.get_theme("s1", None).await.unwrap();
        }

        backend.unplug();
        let storage = Arc::new(FileStorage::new(tmp.path()));
        let restarted = chain(&backend, storage, Duration::from_secs(60));
        let theme = restarted.get_theme("s1", None).await.unwrap();
        assert_eq!(theme.mode, ThemeMode::Dark);
    }
}

mod write_invalidation {
    use super::*;

    #[tokio::test]
    async fn test_set_setting_forces_next_read_to_network() {
        let backend = Arc::new(Backend::default());
        backend.serve("/settings/tax_rate", json!({ "value": 0.08, "scope": "store" }));
        let store = chain(&backend, Arc::new(MemoryStorage::new()), Duration::from_secs(300));

        store.get_setting("tax_rate", None).await.unwrap();
        store.get_setting("tax_rate", None).await.unwrap();
        assert_eq!(backend.gets(), 1);

        store
            .set_setting_as("tax_rate", Scope::Store, &0.09)
            .await
            .unwrap();
        backend.serve("/settings/tax_rate", json!({ "value": 0.09, "scope": "store" }));

        let updated = store.get_setting_as::<f64>("tax_rate", None).await.unwrap();
        assert_eq!(updated.value, 0.09);
        assert_eq!(backend.gets(), 2);
    }

    #[tokio::test]
    async fn test_failed_theme_write_keeps_cached_theme() {
        let backend = Arc::new(Backend::default());
        backend.serve("/theme", json!({ "mode": "light" }));
        let store = chain(&backend, Arc::new(MemoryStorage::new()), Duration::from_secs(300));

        store.get_theme("s1", Some("u1")).await.unwrap();
        backend.unplug();

        let update = PartialThemeConfig {
            mode: Some(ThemeMode::Dark),
            ..PartialThemeConfig::default()
        };
        let err = store
            .set_theme_preference(Scope::User, update, Some("s1"), Some("u1"))
            .await
            .unwrap_err();
        assert!(err.is_transient());

        let cached = store.get_theme("s1", Some("u1")).await.unwrap();
        assert_eq!(cached.mode, ThemeMode::Light);
        assert_eq!(store.get_cache_stats().await.unwrap().entries, 1);
    }

    #[tokio::test]
    async fn test_clear_cache_removes_persisted_blob() {
        let backend = Arc::new(Backend::default());
        backend.serve("/config", json!({ "tenantId": "t-1", "name": "Corner Shop" }));
        let storage = Arc::new(MemoryStorage::new());
        let store = chain(&backend, storage.clone(), Duration::from_secs(300));

        let tenant = store.get_tenant_config().await.unwrap();
        assert_eq!(tenant.name, "Corner Shop");
        assert!(storage.get(CACHE_KEY).is_some());

        store.clear_cache().await.unwrap();
        assert!(storage.get(CACHE_KEY).is_none());
        assert_eq!(store.get_cache_stats().await.unwrap().entries, 0);
    }
}

mod concurrency {
    use super::*;
    use futures::future::join_all;

    #[tokio::test]
    async fn test_concurrent_reads_agree() {
        let backend = Arc::new(Backend::default());
        backend.serve("/settings/currency", json!({ "value": "EUR", "scope": "store" }));
        let store = chain(&backend, Arc::new(MemoryStorage::new()), Duration::from_secs(60));

        let reads = (0..8).map(|_| store.get_setting_as::<String>("currency", None));
        let results = join_all(reads).await;

        for result in results {
            assert_eq!(result.unwrap().value, "EUR");
        }
        assert!((1..=8).contains(&backend.gets()));

        // Everything after the burst is a fresh hit.
        let before = backend.gets();
        store.get_setting("currency", None).await.unwrap();
        assert_eq!(backend.gets(), before);
    }
}
