use super::{ConfigStore, ensure_writable_scope, to_json, validate_theme_write};
use crate::cache::{CacheEntry, CacheKey, CacheStats, TtlCache};
use crate::common::{ConfigError, ConfigResult};
use crate::model::{
    ResolvedConfig, Scope, SettingValue, StoreThemeConfig, TenantConfig, ThemeConfig,
};
use crate::storage::KeyValueStorage;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Decorator that keeps the last good answer for every key.
///
/// The memory cache is authoritative for the session and is mirrored into
/// [`KeyValueStorage`] after every change so the next process starts warm.
/// When the wrapped store fails, the cached value for the same key is served
/// regardless of age; the error only surfaces if the key was never fetched.
pub struct CachedConfigStore {
    inner: Arc<dyn ConfigStore>,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
    cache: TtlCache,
}

impl CachedConfigStore {
    pub fn new(
        inner: Arc<dyn ConfigStore>,
        storage: Arc<dyn KeyValueStorage>,
        storage_key: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        let storage_key = storage_key.into();
        let entries = Self::load_persisted(storage.as_ref(), &storage_key);
        log::debug!(
            "Loaded {} persisted cache entries from '{storage_key}'",
            entries.len()
        );

        Self {
            inner,
            storage,
            storage_key,
            cache: TtlCache::with_entries(cache_ttl, entries),
        }
    }

    fn load_persisted(storage: &dyn KeyValueStorage, storage_key: &str) -> HashMap<String, CacheEntry> {
        let Some(raw) = storage.get(storage_key) else {
            return HashMap::new();
        };

        match serde_json::from_str::<HashMap<String, CacheEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                let err = ConfigError::InvalidCache {
                    reason: e.to_string(),
                };
                log::warn!("Discarding persisted config cache '{storage_key}': {err}");
                HashMap::new()
            }
        }
    }

    async fn persist(&self) {
        let snapshot = self.cache.snapshot().await;
        let result = serde_json::to_string(&snapshot)
            .map_err(|e| ConfigError::Serialization {
                context: "config cache".to_string(),
                reason: e.to_string(),
            })
            .and_then(|raw| self.storage.set(&self.storage_key, &raw));

        if let Err(e) = result {
            // Memory stays authoritative; the mirror catches up on the next write.
            log::warn!("Failed to persist config cache: {e}");
        }
    }

    async fn read_through<T, F, Fut>(&self, cache_key: String, fetch: F) -> ConfigResult<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ConfigResult<T>> + Send,
    {
        if let Some(value) = self.cache.get_fresh(&cache_key).await {
            if let Ok(hit) = serde_json::from_value::<T>(value) {
                log::debug!("Cache hit for {cache_key}");
                return Ok(hit);
            }
        }
        self.fetch_or_stale(cache_key, fetch).await
    }

    /// Fetch and cache the result, falling back to any cached value when the
    /// fetch fails.
    async fn fetch_or_stale<T, F, Fut>(&self, cache_key: String, fetch: F) -> ConfigResult<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ConfigResult<T>> + Send,
    {
        let ticket = self.cache.begin_fetch(&cache_key).await;
        match fetch().await {
            Ok(value) => {
                match to_json(&value, &cache_key) {
                    Ok(raw) => {
                        if self.cache.complete_fetch(ticket, raw).await {
                            self.persist().await;
                        }
                    }
                    Err(e) => log::warn!("Not caching {cache_key}: {e}"),
                }
                Ok(value)
            }
            Err(err) => {
                self.cache.abandon_fetch(ticket).await;
                if let Some(entry) = self.cache.get_stale(&cache_key).await {
                    match serde_json::from_value::<T>(entry.value) {
                        Ok(stale) => {
                            log::warn!(
                                "Serving cached {cache_key} from {} after fetch failure: {err}",
                                entry.timestamp
                            );
                            return Ok(stale);
                        }
                        Err(e) => {
                            log::warn!("Stale entry {cache_key} is unusable: {e}");
                        }
                    }
                }
                Err(err)
            }
        }
    }

    async fn invalidate_prefixes(&self, prefixes: &[String]) {
        for prefix in prefixes {
            self.cache.invalidate_prefix(prefix).await;
        }
        self.persist().await;
    }
}

#[async_trait]
impl ConfigStore for CachedConfigStore {
    async fn get_setting(&self, key: &str, scope: Option<Scope>) -> ConfigResult<SettingValue<Value>> {
        self.read_through(CacheKey::setting(key, scope), || {
            self.inner.get_setting(key, scope)
        })
        .await
    }

    async fn set_setting(&self, key: &str, scope: Scope, value: Value) -> ConfigResult<()> {
        ensure_writable_scope(scope)?;
        self.inner.set_setting(key, scope, value).await?;

        self.invalidate_prefixes(&[CacheKey::setting_prefix(key)])
            .await;
        Ok(())
    }

    async fn get_theme(&self, store_id: &str, user_id: Option<&str>) -> ConfigResult<ThemeConfig> {
        self.read_through(CacheKey::theme(store_id, user_id), || {
            self.inner.get_theme(store_id, user_id)
        })
        .await
    }

    async fn get_store_theme(&self, store_id: &str) -> ConfigResult<StoreThemeConfig> {
        self.read_through(CacheKey::store_theme(store_id), || {
            self.inner.get_store_theme(store_id)
        })
        .await
    }

    async fn refresh_store_theme(&self, store_id: &str) -> ConfigResult<StoreThemeConfig> {
        self.fetch_or_stale(CacheKey::store_theme(store_id), || {
            self.inner.refresh_store_theme(store_id)
        })
        .await
    }

    async fn set_theme(
        &self,
        scope: Scope,
        theme: StoreThemeConfig,
        store_id: Option<&str>,
        user_id: Option<&str>,
    ) -> ConfigResult<()> {
        let store_id = validate_theme_write(scope, store_id, user_id)?;
        self.inner
            .set_theme(scope, theme, Some(store_id), user_id)
            .await?;

        self.invalidate_prefixes(&[
            CacheKey::theme_prefix(store_id),
            CacheKey::store_theme(store_id),
            CacheKey::resolved_config_prefix(store_id),
        ])
        .await;
        Ok(())
    }

    async fn get_tenant_config(&self) -> ConfigResult<TenantConfig> {
        self.read_through(CacheKey::tenant_config(), || self.inner.get_tenant_config())
            .await
    }

    async fn get_resolved_config(
        &self,
        store_id: &str,
        user_id: Option<&str>,
    ) -> ConfigResult<ResolvedConfig> {
        self.read_through(CacheKey::resolved_config(store_id, user_id), || {
            self.inner.get_resolved_config(store_id, user_id)
        })
        .await
    }

    async fn clear_cache(&self) -> ConfigResult<()> {
        self.cache.clear().await;
        self.storage.remove(&self.storage_key)?;
        self.inner.clear_cache().await
    }

    async fn get_cache_stats(&self) -> ConfigResult<CacheStats> {
        Ok(self.cache.stats().await)
    }

    fn adapter_name(&self) -> &'static str {
        "cached"
    }
}
