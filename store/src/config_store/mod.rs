//! # Configuration stores
//!
//! A [`ConfigStore`] reads and writes settings and themes regardless of the
//! backend. Adapters compose as decorators:
//!
//! - [`RemoteConfigStore`] - HTTP API with an in-memory TTL cache; errors
//!   propagate untouched
//! - [`CachedConfigStore`] - wraps any store, mirrors its cache into
//!   [`KeyValueStorage`] and serves stale values when the wrapped store fails
//! - [`LocalDatabaseConfigStore`] - offline-first contract, not implemented
//!
//! Call sites should obtain a store from [`build_config_store`] and only ever
//! see `Arc<dyn ConfigStore>`.
//!
//! ```no_run
//! use store::config_store::{AdapterKind, StoreOptions, build_config_store};
//! use store::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> store::common::ConfigResult<()> {
//! let options = StoreOptions {
//!     adapter: AdapterKind::Cached,
//!     base_url: "https://api.example.com/v1".to_string(),
//!     ..StoreOptions::default()
//! };
//! let store = build_config_store(&options, Arc::new(MemoryStorage::new()))?;
//! let theme = store.get_theme("store-1", Some("user-7")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`KeyValueStorage`]: crate::storage::KeyValueStorage

pub mod cached;
pub mod local_database;
pub mod remote;
pub mod transport;

pub use cached::CachedConfigStore;
pub use local_database::LocalDatabaseConfigStore;
pub use remote::RemoteConfigStore;
pub use transport::{ConfigTransport, HttpTransport};

use crate::cache::{CacheStats, DEFAULT_CACHE_TTL};
use crate::common::{ConfigError, ConfigResult};
use crate::model::{
    PartialThemeConfig, ResolvedConfig, Scope, SettingValue, StoreThemeConfig, TenantConfig,
    ThemeConfig,
};
use crate::storage::KeyValueStorage;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default storage key for the persisted adapter cache.
pub const DEFAULT_CACHE_STORAGE_KEY: &str = "tillcfg.config-cache.v1";

/// Uniform read/write API over settings, themes and tenant configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Resolved value when `scope` is `None`, otherwise the value stored at
    /// that scope.
    async fn get_setting(&self, key: &str, scope: Option<Scope>) -> ConfigResult<SettingValue<Value>>;

    /// Write at `Store` or `User` scope. Invalidates every cached variant of
    /// the key on success.
    async fn set_setting(&self, key: &str, scope: Scope, value: Value) -> ConfigResult<()>;

    /// The fully resolved theme for a store (and optionally a user).
    async fn get_theme(&self, store_id: &str, user_id: Option<&str>) -> ConfigResult<ThemeConfig>;

    /// The raw store layer, including locks and store metadata.
    async fn get_store_theme(&self, store_id: &str) -> ConfigResult<StoreThemeConfig>;

    /// Like [`ConfigStore::get_store_theme`], but a fresh cache entry is not
    /// enough: the backend is asked again. Used before lock checks.
    async fn refresh_store_theme(&self, store_id: &str) -> ConfigResult<StoreThemeConfig> {
        self.get_store_theme(store_id).await
    }

    async fn set_theme(
        &self,
        scope: Scope,
        theme: StoreThemeConfig,
        store_id: Option<&str>,
        user_id: Option<&str>,
    ) -> ConfigResult<()>;

    async fn get_tenant_config(&self) -> ConfigResult<TenantConfig>;

    async fn get_resolved_config(
        &self,
        store_id: &str,
        user_id: Option<&str>,
    ) -> ConfigResult<ResolvedConfig>;

    async fn clear_cache(&self) -> ConfigResult<()>;

    async fn get_cache_stats(&self) -> ConfigResult<CacheStats>;

    fn adapter_name(&self) -> &'static str;
}

/// Typed convenience over [`ConfigStore`].
#[allow(async_fn_in_trait)]
pub trait ConfigStoreExt: ConfigStore {
    async fn get_setting_as<T: DeserializeOwned>(
        &self,
        key: &str,
        scope: Option<Scope>,
    ) -> ConfigResult<SettingValue<T>> {
        self.get_setting(key, scope).await?.decode(key)
    }

    async fn set_setting_as<T: Serialize>(&self, key: &str, scope: Scope, value: &T) -> ConfigResult<()> {
        let value = serde_json::to_value(value).map_err(|e| ConfigError::Serialization {
            context: format!("setting '{key}'"),
            reason: e.to_string(),
        })?;
        self.set_setting(key, scope, value).await
    }

    /// Write a user-facing theme preference (no store metadata).
    async fn set_theme_preference(
        &self,
        scope: Scope,
        theme: PartialThemeConfig,
        store_id: Option<&str>,
        user_id: Option<&str>,
    ) -> ConfigResult<()> {
        self.set_theme(scope, StoreThemeConfig::from(theme), store_id, user_id)
            .await
    }
}

impl<S: ConfigStore + ?Sized> ConfigStoreExt for S {}

/// Reject writes to the default layer.
pub fn ensure_writable_scope(scope: Scope) -> ConfigResult<()> {
    if scope.is_writable() {
        Ok(())
    } else {
        Err(ConfigError::InvalidScope {
            scope: scope.to_string(),
        })
    }
}

/// Validate the identifiers a theme write needs and return the store id.
pub fn validate_theme_write<'a>(
    scope: Scope,
    store_id: Option<&'a str>,
    user_id: Option<&'a str>,
) -> ConfigResult<&'a str> {
    ensure_writable_scope(scope)?;

    let store_id = store_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(ConfigError::MissingIdentifier { field: "storeId" })?;

    if scope == Scope::User && user_id.is_none_or(|id| id.trim().is_empty()) {
        return Err(ConfigError::MissingIdentifier { field: "userId" });
    }

    Ok(store_id)
}

pub(crate) fn to_json<T: Serialize>(value: &T, context: &str) -> ConfigResult<Value> {
    serde_json::to_value(value).map_err(|e| ConfigError::Serialization {
        context: context.to_string(),
        reason: e.to_string(),
    })
}

/// Which adapter chain [`build_config_store`] assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Remote adapter only; no offline fallback.
    Remote,
    /// Remote adapter wrapped in the persistent cache.
    #[default]
    Cached,
    /// Embedded offline-first database.
    LocalDatabase,
}

impl std::str::FromStr for AdapterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "remote" => Ok(AdapterKind::Remote),
            "cached" => Ok(AdapterKind::Cached),
            "local_database" | "sqlite" => Ok(AdapterKind::LocalDatabase),
            other => Err(format!("unknown adapter '{other}'")),
        }
    }
}

/// Settings needed to build an adapter chain.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub adapter: AdapterKind,
    pub base_url: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_storage_key: String,
    pub database_path: Option<PathBuf>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            adapter: AdapterKind::default(),
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout: Duration::from_secs(10),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_storage_key: DEFAULT_CACHE_STORAGE_KEY.to_string(),
            database_path: None,
        }
    }
}

/// Build the configured adapter chain. The only place concrete adapter types
/// are named.
pub fn build_config_store(
    options: &StoreOptions,
    storage: Arc<dyn KeyValueStorage>,
) -> ConfigResult<Arc<dyn ConfigStore>> {
    let remote = || -> ConfigResult<RemoteConfigStore> {
        let transport = HttpTransport::new(options.base_url.clone(), options.request_timeout)?;
        Ok(RemoteConfigStore::new(Arc::new(transport), options.cache_ttl))
    };

    let store: Arc<dyn ConfigStore> = match options.adapter {
        AdapterKind::Remote => Arc::new(remote()?),
        AdapterKind::Cached => Arc::new(CachedConfigStore::new(
            Arc::new(remote()?),
            storage,
            options.cache_storage_key.clone(),
            options.cache_ttl,
        )),
        AdapterKind::LocalDatabase => {
            let path = options
                .database_path
                .clone()
                .unwrap_or_else(LocalDatabaseConfigStore::default_path);
            Arc::new(LocalDatabaseConfigStore::new(path))
        }
    };

    log::info!(
        "Configured {} config store ({})",
        store.adapter_name(),
        options.base_url
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use claims::*;

    #[test]
    fn test_theme_write_requires_identifiers() {
        assert_ok_eq!(validate_theme_write(Scope::Store, Some("s1"), None), "s1");
        assert_ok!(validate_theme_write(Scope::User, Some("s1"), Some("u1")));

        assert_err_eq!(
            validate_theme_write(Scope::Store, None, None),
            ConfigError::MissingIdentifier { field: "storeId" }
        );
        assert_err_eq!(
            validate_theme_write(Scope::User, Some("s1"), None),
            ConfigError::MissingIdentifier { field: "userId" }
        );
        assert_err_eq!(
            validate_theme_write(Scope::User, Some("s1"), Some("  ")),
            ConfigError::MissingIdentifier { field: "userId" }
        );
        assert_err_eq!(
            validate_theme_write(Scope::Default, Some("s1"), Some("u1")),
            ConfigError::InvalidScope {
                scope: "default".to_string()
            }
        );
    }

    #[test]
    fn test_adapter_kind_parsing() {
        assert_eq!("cached".parse::<AdapterKind>().unwrap(), AdapterKind::Cached);
        assert_eq!(
            "local-database".parse::<AdapterKind>().unwrap(),
            AdapterKind::LocalDatabase
        );
        assert!("carrier-pigeon".parse::<AdapterKind>().is_err());
    }

    #[test]
    fn test_factory_builds_each_chain() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());

        for (kind, name) in [
            (AdapterKind::Remote, "remote"),
            (AdapterKind::Cached, "cached"),
            (AdapterKind::LocalDatabase, "local-database"),
        ] {
            let options = StoreOptions {
                adapter: kind,
                ..StoreOptions::default()
            };
            let store = assert_ok!(build_config_store(&options, storage.clone()));
            assert_eq!(store.adapter_name(), name);
        }
    }
}
