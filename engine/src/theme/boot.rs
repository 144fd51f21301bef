//! Boot cache and the synchronous pre-render boot sequence.
//!
//! The boot cache remembers the last theme applied for any store so the next
//! start can paint it before the network answers. Everything here is
//! synchronous and never touches the network.

use super::defaults::{built_in_theme, built_in_with_accent};
use super::display::DisplayedTheme;
use super::validation::ThemeConfigValidator;
use crate::validation::Validator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::common::{ConfigError, ConfigResult};
use store::model::{ColorValue, ThemeConfig};
use store::storage::KeyValueStorage;

/// Storage key of the boot record.
pub const BOOT_CACHE_KEY: &str = "tillcfg.theme.boot.v1";

/// Storage key of the last accent color, used when the full record is gone.
pub const ACCENT_SHORTCUT_KEY: &str = "tillcfg.theme.accent.v1";

/// The last applied theme and the store it belonged to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootRecord {
    pub last_store_id: String,
    pub last_theme: ThemeConfig,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Which source painted the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootSource {
    BootCache,
    AccentShortcut,
    BuiltIn,
}

/// The boot record, or `None` when it is absent, unparsable, incomplete or
/// carries an invalid theme. Never errors.
pub fn load_cached_theme(storage: &dyn KeyValueStorage) -> Option<BootRecord> {
    let raw = storage.get(BOOT_CACHE_KEY)?;

    let record: BootRecord = match serde_json::from_str(&raw) {
        Ok(record) => record,
        Err(e) => {
            log::warn!("Ignoring unreadable boot cache: {e}");
            return None;
        }
    };

    if record.last_store_id.trim().is_empty() {
        log::warn!("Ignoring boot cache without a store id");
        return None;
    }
    if let Err(e) = ThemeConfigValidator.validate(&record.last_theme) {
        log::warn!("Ignoring boot cache theme: {}", e.user_message());
        return None;
    }

    Some(record)
}

/// Remember `theme` as the last one applied for `store_id`, along with the
/// accent shortcut.
pub fn write_boot_cache(
    storage: &dyn KeyValueStorage,
    store_id: &str,
    theme: &ThemeConfig,
) -> ConfigResult<()> {
    let record = BootRecord {
        last_store_id: store_id.to_string(),
        last_theme: theme.clone(),
        timestamp: Some(Utc::now()),
    };
    storage.set(BOOT_CACHE_KEY, &to_string(&record, "boot cache")?)?;

    match &theme.colors.accent {
        Some(accent) => storage.set(ACCENT_SHORTCUT_KEY, &to_string(accent, "accent shortcut")?),
        None => storage.remove(ACCENT_SHORTCUT_KEY),
    }
}

fn to_string<T: Serialize>(value: &T, context: &str) -> ConfigResult<String> {
    serde_json::to_string(value).map_err(|e| ConfigError::Serialization {
        context: context.to_string(),
        reason: e.to_string(),
    })
}

fn load_accent_shortcut(storage: &dyn KeyValueStorage) -> Option<ColorValue> {
    let raw = storage.get(ACCENT_SHORTCUT_KEY)?;
    let accent: ColorValue = serde_json::from_str(&raw)
        .map_err(|e| log::warn!("Ignoring unreadable accent shortcut: {e}"))
        .ok()?;

    let candidate = built_in_with_accent(accent.clone());
    match ThemeConfigValidator.validate(&candidate) {
        Ok(()) => Some(accent),
        Err(e) => {
            log::warn!("Ignoring accent shortcut: {}", e.user_message());
            None
        }
    }
}

/// Paint the first frame before anything else runs.
///
/// Tries the boot record, then the accent shortcut over the built-in theme,
/// then the built-in theme. Display failures are logged; the sequence itself
/// never fails.
pub fn run_boot_sequence(storage: &dyn KeyValueStorage, display: &DisplayedTheme) -> BootSource {
    let (source, theme) = if let Some(record) = load_cached_theme(storage) {
        log::debug!("Booting with cached theme of store {}", record.last_store_id);
        (BootSource::BootCache, record.last_theme)
    } else if let Some(accent) = load_accent_shortcut(storage) {
        log::debug!("Booting with built-in theme and cached accent");
        (BootSource::AccentShortcut, built_in_with_accent(accent))
    } else {
        (BootSource::BuiltIn, built_in_theme().clone())
    };

    if let Err(e) = display.apply(&theme) {
        log::error!("Failed to display boot theme: {e}");
    }
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::display::{InMemoryDocument, StaticSchemePreference};
    use claims::*;
    use std::sync::Arc;
    use store::model::ThemeMode;
    use store::storage::MemoryStorage;

    fn display() -> (Arc<InMemoryDocument>, DisplayedTheme) {
        let document = Arc::new(InMemoryDocument::new());
        let displayed = DisplayedTheme::new(
            document.clone(),
            Arc::new(StaticSchemePreference::default()),
        );
        (document, displayed)
    }

    fn dark_theme() -> ThemeConfig {
        ThemeConfig {
            mode: ThemeMode::Dark,
            ..built_in_theme().clone()
        }
    }

    #[test]
    fn test_written_record_is_loaded_back() {
        let storage = MemoryStorage::new();
        assert_ok!(write_boot_cache(&storage, "s1", &dark_theme()));

        let record = assert_some!(load_cached_theme(&storage));
        assert_eq!(record.last_store_id, "s1");
        assert_eq!(record.last_theme, dark_theme());
        assert_some!(record.timestamp);
        assert_some!(storage.get(ACCENT_SHORTCUT_KEY));
    }

    #[test]
    fn test_malformed_records_are_misses() {
        let storage = MemoryStorage::new();
        assert_none!(load_cached_theme(&storage));

        for raw in [
            "not json",
            r#"{"lastStoreId":"s1"}"#,
            r##"{"lastTheme":{"mode":"dark"}}"##,
            r##"{"lastStoreId":"","lastTheme":{"mode":"dark"}}"##,
            r##"{"lastStoreId":"s1","lastTheme":{"mode":"sepia"}}"##,
            r##"{"lastStoreId":"s1","lastTheme":{"mode":"dark","colors":{"accent":"red;}"}}}"##,
        ] {
            assert_ok!(storage.set(BOOT_CACHE_KEY, raw));
            assert_none!(load_cached_theme(&storage), "accepted {raw}");
        }
    }

    #[test]
    fn test_record_without_timestamp_is_accepted() {
        let storage = MemoryStorage::new();
        assert_ok!(storage.set(
            BOOT_CACHE_KEY,
            r##"{"lastStoreId":"s1","lastTheme":{"mode":"dark"}}"##
        ));

        let record = assert_some!(load_cached_theme(&storage));
        assert_eq!(record.last_theme.mode, ThemeMode::Dark);
        assert_none!(record.timestamp);
    }

    #[test]
    fn test_boot_prefers_cached_theme() {
        let storage = MemoryStorage::new();
        assert_ok!(write_boot_cache(&storage, "s1", &dark_theme()));
        let (document, displayed) = display();

        assert_eq!(run_boot_sequence(&storage, &displayed), BootSource::BootCache);
        let snapshot = assert_some!(document.snapshot());
        assert_eq!(snapshot.theme_attribute(), Some("dark"));
    }

    #[test]
    fn test_boot_falls_back_to_accent_shortcut() {
        let storage = MemoryStorage::new();
        assert_ok!(storage.set(ACCENT_SHORTCUT_KEY, r##""#ff0066""##));
        assert_ok!(storage.set(BOOT_CACHE_KEY, "{corrupt"));
        let (document, displayed) = display();

        assert_eq!(
            run_boot_sequence(&storage, &displayed),
            BootSource::AccentShortcut
        );
        let snapshot = assert_some!(document.snapshot());
        assert_eq!(snapshot.properties["--color-accent"], "#ff0066");
    }

    #[test]
    fn test_boot_with_empty_storage_uses_built_in() {
        let storage = MemoryStorage::new();
        let (document, displayed) = display();

        assert_eq!(run_boot_sequence(&storage, &displayed), BootSource::BuiltIn);
        let snapshot = assert_some!(document.snapshot());
        assert_eq!(snapshot.theme_attribute(), Some("light"));
    }
}
