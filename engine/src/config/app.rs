use super::{LoggingConfig, limits::*, setup, validation::ConfigValidationError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use store::cache::DEFAULT_CACHE_TTL;
use store::config_store::{AdapterKind, DEFAULT_CACHE_STORAGE_KEY, StoreOptions};

/// Main application configuration
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    storage_dir: Option<String>,

    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    store: StoreConfig,
    #[serde(default)]
    display: DisplayConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or("http://localhost:3000/api")
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

/// Adapter chain settings
#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    adapter: Option<String>,
    cache_ttl_secs: Option<u64>,
    cache_storage_key: Option<String>,
    database_path: Option<String>,
}

impl StoreConfig {
    pub fn adapter(&self) -> &str {
        self.adapter.as_deref().unwrap_or("cached")
    }

    pub fn cache_ttl_secs(&self) -> u64 {
        self.cache_ttl_secs
            .unwrap_or_else(|| DEFAULT_CACHE_TTL.as_secs())
    }

    pub fn cache_storage_key(&self) -> &str {
        self.cache_storage_key
            .as_deref()
            .unwrap_or(DEFAULT_CACHE_STORAGE_KEY)
    }

    pub fn database_path(&self) -> Option<&str> {
        self.database_path.as_deref()
    }
}

/// Display sink settings
#[derive(Debug, Default, Deserialize)]
pub struct DisplayConfig {
    prefers_dark: Option<bool>,
    stylesheet: Option<String>,
}

impl DisplayConfig {
    /// Platform color-scheme preference used by the `auto` mode.
    pub fn prefers_dark(&self) -> bool {
        self.prefers_dark.unwrap_or(false)
    }

    /// Where to write the rendered stylesheet. `None` keeps it in memory.
    pub fn stylesheet(&self) -> Option<&str> {
        self.stylesheet.as_deref()
    }
}

impl AppConfig {
    /// Validate the configuration against defined limits
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let base_url = self.api.base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(ConfigValidationError::BaseUrl {
                configured: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        } else if base_url
            .split("://")
            .nth(1)
            .is_none_or(|host| host.trim_matches('/').is_empty())
        {
            errors.push(ConfigValidationError::BaseUrl {
                configured: base_url.to_string(),
                reason: "host is missing".to_string(),
            });
        }

        let timeout = self.api.timeout_secs();
        if !(MIN_REQUEST_TIMEOUT_SECS..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout) {
            errors.push(ConfigValidationError::RequestTimeout {
                configured: timeout,
                min_limit: MIN_REQUEST_TIMEOUT_SECS,
                max_limit: MAX_REQUEST_TIMEOUT_SECS,
            });
        }

        if self.store.adapter().parse::<AdapterKind>().is_err() {
            errors.push(ConfigValidationError::Adapter {
                configured: self.store.adapter().to_string(),
            });
        }

        if self.store.cache_ttl_secs() > MAX_CACHE_TTL_SECS {
            errors.push(ConfigValidationError::CacheTtl {
                configured: self.store.cache_ttl_secs(),
                limit: MAX_CACHE_TTL_SECS,
            });
        }

        let storage_key = self.store.cache_storage_key();
        if storage_key.trim().is_empty() || storage_key.len() > MAX_STORAGE_KEY_LEN {
            errors.push(ConfigValidationError::StorageKey {
                configured: storage_key.to_string(),
                limit: MAX_STORAGE_KEY_LEN,
            });
        }

        let level = self.logging.level().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::LogLevel {
                configured: self.logging.level().to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Options for [`store::config_store::build_config_store`]. Call
    /// [`AppConfig::validate`] first; an unknown adapter falls back to the
    /// default chain here.
    pub fn store_options(&self) -> StoreOptions {
        let adapter = self.store.adapter().parse().unwrap_or_else(|e| {
            log::warn!("{e}, using the default adapter");
            AdapterKind::default()
        });

        StoreOptions {
            adapter,
            base_url: self.api.base_url().to_string(),
            request_timeout: Duration::from_secs(self.api.timeout_secs()),
            cache_ttl: Duration::from_secs(self.store.cache_ttl_secs()),
            cache_storage_key: self.store.cache_storage_key().to_string(),
            database_path: self.store.database_path().map(PathBuf::from),
        }
    }

    /// Directory backing the persistent key-value storage.
    pub fn storage_dir(&self) -> Result<PathBuf, setup::SetupError> {
        match self.storage_dir.as_deref() {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => setup::get_data_dir(),
        }
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}
