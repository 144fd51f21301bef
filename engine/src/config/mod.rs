//! # Configuration Module
//!
//! Application settings are read from an optional `tillcfg.toml` and from
//! `TILLCFG__`-prefixed environment variables (a `.env` file is honored).
//! Environment entries override file values, with `__` separating sections:
//! `TILLCFG__API__BASE_URL`, `TILLCFG__STORE__ADAPTER`, ...
//!
//! Every field is optional; accessors supply the defaults.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub mod app;
pub mod limits;
pub mod setup;
pub mod validation;

pub use app::{ApiConfig, AppConfig, DisplayConfig, StoreConfig};
pub use validation::{ConfigLoadResult, ConfigValidationError};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TILLCFG";

/// Load configuration from `path`, or from the discovered config file when
/// `path` is `None`. A missing discovered file is not an error.
pub fn load_config(path: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();
    let env_source = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true);

    let file = path
        .map(|p| (p.to_path_buf(), true))
        .or_else(|| setup::find_config_file().map(|p| (p, false)));

    load_from_sources(file, env_source)
}

fn load_from_sources(file: Option<(PathBuf, bool)>, env_source: Environment) -> ConfigLoadResult {
    let mut builder = Config::builder();
    if let Some((file_path, required)) = file {
        log::debug!("Reading configuration from {}", file_path.display());
        builder = builder.add_source(File::from(file_path).required(required));
    }

    let config = match builder.add_source(env_source).build() {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your tillcfg.toml file and environment variables."
            ));
        }
    };

    match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => ConfigLoadResult::Success(Box::new(app_config)),
        Err(e) => ConfigLoadResult::DeserializeError(format!("Failed to deserialize config: {e}")),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}
