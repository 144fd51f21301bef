use super::boot::{self, BootRecord, BootSource};
use super::defaults::built_in_theme;
use super::display::{DisplayMode, DisplayedTheme};
use super::validation::{PartialThemeValidator, ThemeConfigValidator};
use crate::error::AppResult;
use crate::validation::Validator;
use std::sync::{Arc, PoisonError, RwLock};
use store::common::{ConfigError, ConfigResult, LockedDimension};
use store::config_store::{ConfigStore, ConfigStoreExt, ensure_writable_scope};
use store::model::{PartialThemeConfig, Scope, StoreThemeConfig, ThemeConfig};
use store::storage::KeyValueStorage;

/// Where an applied theme came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    /// Answered by the config store (possibly from its cache).
    Remote,
    /// The last theme applied for any store, from the boot cache.
    BootCache,
    BuiltIn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTheme {
    pub theme: ThemeConfig,
    pub source: ThemeSource,
    pub mode: DisplayMode,
}

#[derive(Debug, Clone)]
struct Session {
    store_id: String,
    user_id: Option<String>,
}

/// Resolves, applies and persists themes for one display.
///
/// Saves are not serialized: two overlapping saves both write, and whichever
/// re-fetch completes last decides what is displayed.
pub struct ThemeEngine {
    store: Arc<dyn ConfigStore>,
    storage: Arc<dyn KeyValueStorage>,
    display: DisplayedTheme,
    session: RwLock<Option<Session>>,
    current: RwLock<Option<ThemeConfig>>,
}

impl ThemeEngine {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        storage: Arc<dyn KeyValueStorage>,
        display: DisplayedTheme,
    ) -> Self {
        Self {
            store,
            storage,
            display,
            session: RwLock::new(None),
            current: RwLock::new(None),
        }
    }

    /// Paint the first frame from local state only.
    pub fn boot(&self) -> BootSource {
        let source = boot::run_boot_sequence(self.storage.as_ref(), &self.display);
        log::info!("Boot sequence painted {source:?} theme");
        source
    }

    /// Start a session for `store_id` and display its theme.
    ///
    /// Falls back to the boot cache (whatever store it belongs to) and then
    /// to the built-in theme when the store cannot answer. A blank `store_id`
    /// still paints the fallback before failing with
    /// [`ConfigError::MissingIdentifier`].
    pub async fn initialize(&self, store_id: &str, user_id: Option<&str>) -> AppResult<AppliedTheme> {
        if store_id.trim().is_empty() {
            if let Err(e) = self.show_fallback() {
                log::warn!("Failed to display fallback theme: {e}");
            }
            return Err(ConfigError::MissingIdentifier { field: "storeId" }.into());
        }
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            store_id: store_id.to_string(),
            user_id: user_id.map(str::to_string),
        });

        match self.fetch_valid_theme(store_id, user_id).await {
            Ok(theme) => {
                log::info!("Initialized theme for store {store_id}");
                self.show(theme, ThemeSource::Remote, Some(store_id))
            }
            Err(e) => {
                log::warn!("Falling back to cached theme for store {store_id}: {e}");
                self.show_fallback()
            }
        }
    }

    /// Save a partial theme at store or user scope and display the result.
    ///
    /// User saves are checked against the store's locks first; touching a
    /// locked dimension fails with [`ConfigError::LockedField`] and nothing
    /// is written.
    pub async fn save_theme_preference(
        &self,
        scope: Scope,
        partial: PartialThemeConfig,
    ) -> AppResult<AppliedTheme> {
        let session = self
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ConfigError::NotInitialized)?;

        ensure_writable_scope(scope)?;
        let user_id = match scope {
            Scope::User => Some(session.user_id.as_deref().ok_or(ConfigError::MissingUserId)?),
            _ => None,
        };

        PartialThemeValidator
            .validate(&partial)
            .map_err(ConfigError::from)?;

        if scope == Scope::User {
            let store_layer = self.store_layer(&session.store_id).await?;
            check_locks(&store_layer, &partial)?;
        }

        self.store
            .set_theme_preference(scope, partial, Some(&session.store_id), user_id)
            .await?;
        log::info!("Saved {scope} theme preference for store {}", session.store_id);

        let theme = self
            .fetch_valid_theme(&session.store_id, session.user_id.as_deref())
            .await?;
        self.show(theme, ThemeSource::Remote, Some(&session.store_id))
    }

    /// The boot record, if a usable one exists.
    pub fn load_cached_theme(&self) -> Option<BootRecord> {
        boot::load_cached_theme(self.storage.as_ref())
    }

    /// Validate and display `theme` without touching the store or the boot
    /// cache.
    pub fn apply_theme(&self, theme: &ThemeConfig) -> AppResult<DisplayMode> {
        ThemeConfigValidator
            .validate(theme)
            .map_err(ConfigError::from)?;
        let mode = self.display.apply(theme)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(theme.clone());
        Ok(mode)
    }

    /// The theme most recently displayed through this engine.
    pub fn current_theme(&self) -> Option<ThemeConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store_id(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.store_id.clone())
    }

    pub fn display(&self) -> &DisplayedTheme {
        &self.display
    }

    async fn fetch_valid_theme(&self, store_id: &str, user_id: Option<&str>) -> ConfigResult<ThemeConfig> {
        let theme = self.store.get_theme(store_id, user_id).await?;
        ThemeConfigValidator.validate(&theme)?;
        Ok(theme)
    }

    /// The current store layer, re-read so recently added locks apply. A
    /// store without one has no locks.
    async fn store_layer(&self, store_id: &str) -> ConfigResult<StoreThemeConfig> {
        match self.store.refresh_store_theme(store_id).await {
            Ok(layer) => Ok(layer),
            Err(ConfigError::Network(e)) if e.is_not_found() => Ok(StoreThemeConfig::default()),
            Err(e) => Err(e),
        }
    }

    /// The boot cache, else the built-in theme. Never written back.
    fn show_fallback(&self) -> AppResult<AppliedTheme> {
        match self.load_cached_theme() {
            Some(record) => self.show(record.last_theme, ThemeSource::BootCache, None),
            None => self.show(built_in_theme().clone(), ThemeSource::BuiltIn, None),
        }
    }

    fn show(
        &self,
        theme: ThemeConfig,
        source: ThemeSource,
        remember_for: Option<&str>,
    ) -> AppResult<AppliedTheme> {
        let mode = self.apply_theme(&theme)?;

        if let Some(store_id) = remember_for {
            if let Err(e) = boot::write_boot_cache(self.storage.as_ref(), store_id, &theme) {
                log::warn!("Failed to update boot cache: {e}");
            }
        }

        Ok(AppliedTheme {
            theme,
            source,
            mode,
        })
    }
}

/// Reject a user overlay that touches a dimension the store locked.
pub fn check_locks(store_layer: &StoreThemeConfig, partial: &PartialThemeConfig) -> ConfigResult<()> {
    let locks = store_layer.locks();
    if locks.lock_mode && partial.touches_mode() {
        return Err(ConfigError::LockedField {
            dimension: LockedDimension::Mode,
        });
    }
    if locks.lock_accent && partial.touches_accent() {
        return Err(ConfigError::LockedField {
            dimension: LockedDimension::Accent,
        });
    }
    Ok(())
}
