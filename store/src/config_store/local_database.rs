use super::{ConfigStore, ensure_writable_scope, validate_theme_write};
use crate::cache::CacheStats;
use crate::common::{ConfigError, ConfigResult};
use crate::model::{
    ResolvedConfig, Scope, SettingValue, StoreThemeConfig, TenantConfig, ThemeConfig,
};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

const ADAPTER: &str = "local-database";

/// Offline-first adapter backed by an embedded database file.
///
/// Only the contract exists: arguments are validated exactly like the other
/// adapters, then every operation fails with [`ConfigError::NotImplemented`].
#[derive(Debug, Clone)]
pub struct LocalDatabaseConfigStore {
    database_path: PathBuf,
}

impl LocalDatabaseConfigStore {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    /// `<platform data dir>/tillcfg/tillcfg.db`, or a relative file when the
    /// platform has no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("tillcfg"))
            .unwrap_or_default()
            .join("tillcfg.db")
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    fn unsupported<T>(&self, operation: &'static str) -> ConfigResult<T> {
        log::debug!(
            "{operation} requested from local database at {}",
            self.database_path.display()
        );
        Err(ConfigError::NotImplemented {
            adapter: ADAPTER,
            operation,
        })
    }
}

#[async_trait]
impl ConfigStore for LocalDatabaseConfigStore {
    async fn get_setting(&self, _key: &str, _scope: Option<Scope>) -> ConfigResult<SettingValue<Value>> {
        self.unsupported("get_setting")
    }

    async fn set_setting(&self, _key: &str, scope: Scope, _value: Value) -> ConfigResult<()> {
        ensure_writable_scope(scope)?;
        self.unsupported("set_setting")
    }

    async fn get_theme(&self, _store_id: &str, _user_id: Option<&str>) -> ConfigResult<ThemeConfig> {
        self.unsupported("get_theme")
    }

    async fn get_store_theme(&self, _store_id: &str) -> ConfigResult<StoreThemeConfig> {
        self.unsupported("get_store_theme")
    }

    async fn set_theme(
        &self,
        scope: Scope,
        _theme: StoreThemeConfig,
        store_id: Option<&str>,
        user_id: Option<&str>,
    ) -> ConfigResult<()> {
        validate_theme_write(scope, store_id, user_id)?;
        self.unsupported("set_theme")
    }

    async fn get_tenant_config(&self) -> ConfigResult<TenantConfig> {
        self.unsupported("get_tenant_config")
    }

    async fn get_resolved_config(
        &self,
        _store_id: &str,
        _user_id: Option<&str>,
    ) -> ConfigResult<ResolvedConfig> {
        self.unsupported("get_resolved_config")
    }

    async fn clear_cache(&self) -> ConfigResult<()> {
        self.unsupported("clear_cache")
    }

    async fn get_cache_stats(&self) -> ConfigResult<CacheStats> {
        self.unsupported("get_cache_stats")
    }

    fn adapter_name(&self) -> &'static str {
        ADAPTER
    }
}
