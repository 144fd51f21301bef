//! In-process doubles for the transport and store seams.
//!
//! Available to this crate's tests and, through the `test-utils` feature, to
//! dependent crates.

use crate::cache::CacheStats;
use crate::common::{ConfigError, ConfigResult, HttpError};
use crate::config_store::{ConfigStore, ConfigTransport, ensure_writable_scope, validate_theme_write};
use crate::model::{
    PartialThemeConfig, ResolvedConfig, ResolvedMeta, Scope, ScopeContributions, SettingValue,
    StoreThemeConfig, TenantConfig, ThemeConfig,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn offline_error(target: &str) -> HttpError {
    HttpError::RequestFailed {
        url: target.to_string(),
        reason: "network unreachable".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transport that answers from a table of canned responses.
///
/// Unscripted GETs answer `NotFound`; every PUT succeeds and is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, Value>>,
    gets: Mutex<HashMap<String, u32>>,
    puts: Mutex<Vec<(String, Value)>>,
    offline: AtomicBool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn request_key<K: AsRef<str>, V: AsRef<str>>(path: &str, query: &[(K, V)]) -> String {
        if query.is_empty() {
            return path.to_string();
        }
        let pairs: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect();
        format!("{path}?{}", pairs.join("&"))
    }

    /// Answer GET `path` with exactly these query pairs (in order).
    pub fn respond(&self, path: &str, query: &[(&str, &str)], body: Value) {
        lock(&self.responses).insert(Self::request_key(path, query), body);
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// GETs issued to `path`, whatever their query.
    pub fn get_count(&self, path: &str) -> u32 {
        lock(&self.gets).get(path).copied().unwrap_or(0)
    }

    pub fn put_count(&self) -> usize {
        lock(&self.puts).len()
    }

    pub fn last_put(&self, path: &str) -> Option<Value> {
        lock(&self.puts)
            .iter()
            .rev()
            .find(|(put_path, _)| put_path == path)
            .map(|(_, body)| body.clone())
    }
}

#[async_trait]
impl ConfigTransport for ScriptedTransport {
    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> Result<Value, HttpError> {
        *lock(&self.gets).entry(path.to_string()).or_insert(0) += 1;

        let key = Self::request_key(path, query);
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline_error(&key));
        }

        lock(&self.responses)
            .get(&key)
            .cloned()
            .ok_or(HttpError::NotFound { url: key })
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, HttpError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline_error(path));
        }
        lock(&self.puts).push((path.to_string(), body));
        Ok(Value::Null)
    }
}

/// A theme write observed by [`StubConfigStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedThemeWrite {
    pub scope: Scope,
    pub theme: StoreThemeConfig,
    pub store_id: String,
    pub user_id: Option<String>,
}

#[derive(Default)]
struct StubState {
    settings: HashMap<(String, Scope), Value>,
    resolved_themes: HashMap<(String, Option<String>), ThemeConfig>,
    base_theme: ThemeConfig,
    store_layers: HashMap<String, StoreThemeConfig>,
    user_layers: HashMap<(String, String), PartialThemeConfig>,
    tenant: TenantConfig,
    theme_writes: Vec<RecordedThemeWrite>,
}

/// Backend double holding store and user layers in memory.
///
/// `get_theme` answers a theme pinned with [`StubConfigStore::put_theme`],
/// otherwise the base theme with the store and user layers overlaid in
/// order. The backend applies no locks; enforcing them is the caller's job.
#[derive(Default)]
pub struct StubConfigStore {
    state: Mutex<StubState>,
    offline: AtomicBool,
    fail_writes: AtomicBool,
    theme_reads: AtomicU32,
    store_theme_reads: AtomicU32,
}

impl StubConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_setting(&self, key: &str, scope: Scope, value: Value) {
        lock(&self.state)
            .settings
            .insert((key.to_string(), scope), value);
    }

    /// Pin the resolved theme for a store/user pair.
    pub fn put_theme(&self, store_id: &str, user_id: Option<&str>, theme: ThemeConfig) {
        lock(&self.state)
            .resolved_themes
            .insert((store_id.to_string(), user_id.map(str::to_string)), theme);
    }

    pub fn put_base_theme(&self, theme: ThemeConfig) {
        lock(&self.state).base_theme = theme;
    }

    pub fn put_store_theme(&self, store_id: &str, theme: StoreThemeConfig) {
        lock(&self.state)
            .store_layers
            .insert(store_id.to_string(), theme);
    }

    pub fn put_user_theme(&self, store_id: &str, user_id: &str, theme: PartialThemeConfig) {
        lock(&self.state)
            .user_layers
            .insert((store_id.to_string(), user_id.to_string()), theme);
    }

    pub fn put_tenant(&self, tenant: TenantConfig) {
        lock(&self.state).tenant = tenant;
    }

    /// Every operation fails with a network error until [`Self::go_online`].
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// Reads keep working but writes fail with a server error.
    pub fn reject_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn theme_writes(&self) -> Vec<RecordedThemeWrite> {
        lock(&self.state).theme_writes.clone()
    }

    pub fn theme_reads(&self) -> u32 {
        self.theme_reads.load(Ordering::SeqCst)
    }

    pub fn store_theme_reads(&self) -> u32 {
        self.store_theme_reads.load(Ordering::SeqCst)
    }

    fn check_online(&self, operation: &str) -> ConfigResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ConfigError::Network(offline_error(&format!("stub://{operation}"))))
        } else {
            Ok(())
        }
    }

    fn check_writable(&self, operation: &str) -> ConfigResult<()> {
        self.check_online(operation)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConfigError::Network(HttpError::Status {
                url: format!("stub://{operation}"),
                status: 503,
                body: "writes disabled".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for StubConfigStore {
    async fn get_setting(&self, key: &str, scope: Option<Scope>) -> ConfigResult<SettingValue<Value>> {
        self.check_online("get_setting")?;
        let state = lock(&self.state);

        let lookup_order = match scope {
            Some(scope) => vec![scope],
            None => vec![Scope::User, Scope::Store, Scope::Default],
        };
        lookup_order
            .into_iter()
            .find_map(|scope| {
                state
                    .settings
                    .get(&(key.to_string(), scope))
                    .map(|value| SettingValue::new(value.clone(), scope))
            })
            .ok_or_else(|| ConfigError::SettingNotFound {
                key: key.to_string(),
            })
    }

    async fn set_setting(&self, key: &str, scope: Scope, value: Value) -> ConfigResult<()> {
        ensure_writable_scope(scope)?;
        self.check_writable("set_setting")?;
        self.put_setting(key, scope, value);
        Ok(())
    }

    async fn get_theme(&self, store_id: &str, user_id: Option<&str>) -> ConfigResult<ThemeConfig> {
        self.theme_reads.fetch_add(1, Ordering::SeqCst);
        self.check_online("get_theme")?;
        let state = lock(&self.state);

        let pinned = (store_id.to_string(), user_id.map(str::to_string));
        if let Some(theme) = state.resolved_themes.get(&pinned) {
            return Ok(theme.clone());
        }

        let mut theme = state.base_theme.clone();
        if let Some(store_layer) = state.store_layers.get(store_id) {
            store_layer.theme.overlay_onto(&mut theme);
        }
        if let Some(user_id) = user_id {
            if let Some(user_layer) = state
                .user_layers
                .get(&(store_id.to_string(), user_id.to_string()))
            {
                user_layer.overlay_onto(&mut theme);
            }
        }
        Ok(theme)
    }

    async fn get_store_theme(&self, store_id: &str) -> ConfigResult<StoreThemeConfig> {
        self.store_theme_reads.fetch_add(1, Ordering::SeqCst);
        self.check_online("get_store_theme")?;
        Ok(lock(&self.state)
            .store_layers
            .get(store_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_theme(
        &self,
        scope: Scope,
        theme: StoreThemeConfig,
        store_id: Option<&str>,
        user_id: Option<&str>,
    ) -> ConfigResult<()> {
        let store_id = validate_theme_write(scope, store_id, user_id)?;
        self.check_writable("set_theme")?;

        let mut state = lock(&self.state);
        state.theme_writes.push(RecordedThemeWrite {
            scope,
            theme: theme.clone(),
            store_id: store_id.to_string(),
            user_id: user_id.map(str::to_string),
        });
        // A write supersedes any pinned answer for the store.
        state
            .resolved_themes
            .retain(|(pinned_store, _), _| pinned_store != store_id);

        match (scope, user_id) {
            (Scope::User, Some(user_id)) => {
                let layer = state
                    .user_layers
                    .entry((store_id.to_string(), user_id.to_string()))
                    .or_default();
                merge_partial(layer, theme.theme);
            }
            _ => {
                let layer = state.store_layers.entry(store_id.to_string()).or_default();
                merge_partial(&mut layer.theme, theme.theme);
                if theme.locks.is_some() {
                    layer.locks = theme.locks;
                }
                if theme.logo.is_some() {
                    layer.logo = theme.logo;
                }
                if theme.company_name.is_some() {
                    layer.company_name = theme.company_name;
                }
            }
        }
        Ok(())
    }

    async fn get_tenant_config(&self) -> ConfigResult<TenantConfig> {
        self.check_online("get_tenant_config")?;
        Ok(lock(&self.state).tenant.clone())
    }

    async fn get_resolved_config(
        &self,
        store_id: &str,
        user_id: Option<&str>,
    ) -> ConfigResult<ResolvedConfig> {
        self.check_online("get_resolved_config")?;
        let state = lock(&self.state);

        let scopes = ScopeContributions {
            tenant: true,
            store: state.store_layers.contains_key(store_id),
            user: user_id.is_some_and(|user_id| {
                state
                    .user_layers
                    .contains_key(&(store_id.to_string(), user_id.to_string()))
            }),
        };
        Ok(ResolvedConfig {
            config: state.tenant.clone(),
            meta: ResolvedMeta {
                resolved_at: chrono::Utc::now(),
                scopes,
            },
        })
    }

    async fn clear_cache(&self) -> ConfigResult<()> {
        Ok(())
    }

    async fn get_cache_stats(&self) -> ConfigResult<CacheStats> {
        Ok(CacheStats::default())
    }

    fn adapter_name(&self) -> &'static str {
        "stub"
    }
}

/// Fold a partial write into a stored partial layer.
fn merge_partial(layer: &mut PartialThemeConfig, update: PartialThemeConfig) {
    if update.mode.is_some() {
        layer.mode = update.mode;
    }
    if let Some(colors) = update.colors {
        layer.colors.get_or_insert_with(Default::default).merge_from(&colors);
    }
    if update.fonts.is_some() {
        layer.fonts = update.fonts;
    }
    if update.spacing.is_some() {
        layer.spacing = update.spacing;
    }
    if update.border_radius.is_some() {
        layer.border_radius = update.border_radius;
    }
    if update.animations.is_some() {
        layer.animations = update.animations;
    }
}
