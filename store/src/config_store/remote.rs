use super::{
    ConfigStore, ConfigTransport, ensure_writable_scope, to_json, validate_theme_write,
};
use crate::cache::{CacheKey, CacheStats, TtlCache};
use crate::common::{ConfigError, ConfigResult, HttpError};
use crate::model::{
    ResolvedConfig, Scope, SettingValue, StoreThemeConfig, TenantConfig, ThemeConfig,
};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// HTTP-backed store with an in-memory TTL cache.
///
/// Fresh cache hits skip the network. Misses go to the transport and
/// successful responses are cached; failures propagate untouched, since
/// falling back to stale data is the job of a decorating layer.
pub struct RemoteConfigStore {
    transport: Arc<dyn ConfigTransport>,
    cache: TtlCache,
}

impl RemoteConfigStore {
    pub fn new(transport: Arc<dyn ConfigTransport>, cache_ttl: Duration) -> Self {
        Self {
            transport,
            cache: TtlCache::new(cache_ttl),
        }
    }

    async fn fetch<T>(
        &self,
        cache_key: String,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, HttpError>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(value) = self.cache.get_fresh(&cache_key).await {
            match serde_json::from_value::<T>(value) {
                Ok(hit) => {
                    log::debug!("Cache hit for {cache_key}");
                    return Ok(hit);
                }
                Err(e) => {
                    log::warn!("Ignoring undecodable cache entry {cache_key}: {e}");
                }
            }
        }

        let ticket = self.cache.begin_fetch(&cache_key).await;
        let fetched = async {
            let raw = self.transport.get(path, query).await?;
            let parsed: T =
                serde_json::from_value(raw.clone()).map_err(|e| HttpError::InvalidResponse {
                    expected: std::any::type_name::<T>().to_string(),
                    actual: e.to_string(),
                })?;
            Ok::<_, HttpError>((raw, parsed))
        }
        .await;

        match fetched {
            Ok((raw, parsed)) => {
                self.cache.complete_fetch(ticket, raw).await;
                Ok(parsed)
            }
            Err(e) => {
                self.cache.abandon_fetch(ticket).await;
                Err(e)
            }
        }
    }

    fn user_query(store_id: &str, user_id: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = vec![("storeId", store_id.to_string())];
        if let Some(user_id) = user_id {
            query.push(("userId", user_id.to_string()));
        }
        query
    }

    async fn invalidate_store_themes(&self, store_id: &str) {
        self.cache.invalidate_prefix(&CacheKey::theme_prefix(store_id)).await;
        self.cache.invalidate(&CacheKey::store_theme(store_id)).await;
        self.cache
            .invalidate_prefix(&CacheKey::resolved_config_prefix(store_id))
            .await;
    }
}

#[async_trait]
impl ConfigStore for RemoteConfigStore {
    async fn get_setting(&self, key: &str, scope: Option<Scope>) -> ConfigResult<SettingValue<Value>> {
        let path = format!("/settings/{}", urlencoding::encode(key));
        let query: Vec<(&'static str, String)> = scope
            .map(|scope| vec![("scope", scope.to_string())])
            .unwrap_or_default();

        self.fetch(CacheKey::setting(key, scope), &path, &query)
            .await
            .map_err(|e| match e {
                HttpError::NotFound { .. } => ConfigError::SettingNotFound {
                    key: key.to_string(),
                },
                other => ConfigError::Network(other),
            })
    }

    async fn set_setting(&self, key: &str, scope: Scope, value: Value) -> ConfigResult<()> {
        ensure_writable_scope(scope)?;

        let path = format!("/settings/{}", urlencoding::encode(key));
        self.transport
            .put(&path, json!({ "scope": scope, "value": value }))
            .await?;

        self.cache.invalidate(&CacheKey::setting(key, Some(scope))).await;
        self.cache.invalidate(&CacheKey::setting(key, None)).await;
        log::info!("Updated setting '{key}' at {scope} scope");
        Ok(())
    }

    async fn get_theme(&self, store_id: &str, user_id: Option<&str>) -> ConfigResult<ThemeConfig> {
        let query = Self::user_query(store_id, user_id);
        Ok(self
            .fetch(CacheKey::theme(store_id, user_id), "/theme", &query)
            .await?)
    }

    async fn get_store_theme(&self, store_id: &str) -> ConfigResult<StoreThemeConfig> {
        let query = vec![("storeId", store_id.to_string())];
        Ok(self
            .fetch(CacheKey::store_theme(store_id), "/theme/store", &query)
            .await?)
    }

    async fn refresh_store_theme(&self, store_id: &str) -> ConfigResult<StoreThemeConfig> {
        self.cache.invalidate(&CacheKey::store_theme(store_id)).await;
        self.get_store_theme(store_id).await
    }

    async fn set_theme(
        &self,
        scope: Scope,
        theme: StoreThemeConfig,
        store_id: Option<&str>,
        user_id: Option<&str>,
    ) -> ConfigResult<()> {
        let store_id = validate_theme_write(scope, store_id, user_id)?;
        let body = json!({
            "scope": scope,
            "theme": to_json(&theme, "theme")?,
            "storeId": store_id,
            "userId": user_id,
        });

        self.transport.put("/theme", body).await?;
        self.invalidate_store_themes(store_id).await;
        log::info!("Updated {scope} theme for store {store_id}");
        Ok(())
    }

    async fn get_tenant_config(&self) -> ConfigResult<TenantConfig> {
        Ok(self.fetch(CacheKey::tenant_config(), "/config", &[]).await?)
    }

    async fn get_resolved_config(
        &self,
        store_id: &str,
        user_id: Option<&str>,
    ) -> ConfigResult<ResolvedConfig> {
        let query = Self::user_query(store_id, user_id);
        Ok(self
            .fetch(
                CacheKey::resolved_config(store_id, user_id),
                "/config/resolved",
                &query,
            )
            .await?)
    }

    async fn clear_cache(&self) -> ConfigResult<()> {
        self.cache.clear().await;
        Ok(())
    }

    async fn get_cache_stats(&self) -> ConfigResult<CacheStats> {
        Ok(self.cache.stats().await)
    }

    fn adapter_name(&self) -> &'static str {
        "remote"
    }
}
