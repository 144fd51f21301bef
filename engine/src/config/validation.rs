use super::app::AppConfig;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid api.base_url: '{configured}' ({reason})")]
    BaseUrl { configured: String, reason: String },
    #[error("Invalid api.timeout_secs: {configured} (min: {min_limit}, max: {max_limit})")]
    RequestTimeout {
        configured: u64,
        min_limit: u64,
        max_limit: u64,
    },
    #[error("Invalid store.adapter: '{configured}'")]
    Adapter { configured: String },
    #[error("Invalid store.cache_ttl_secs: {configured} (limit: {limit})")]
    CacheTtl { configured: u64, limit: u64 },
    #[error("Invalid store.cache_storage_key: '{configured}' (max length: {limit})")]
    StorageKey { configured: String, limit: usize },
    #[error("Invalid logging.level: '{configured}'")]
    LogLevel { configured: String },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::BaseUrl { configured, reason } => {
                format!(
                    "API base URL is not usable!\n\n\
                    Your configured value: {configured}\n\
                    Problem: {reason}\n\n\
                    Please set api.base_url to an http:// or https:// URL."
                )
            }
            ConfigValidationError::RequestTimeout {
                configured,
                min_limit,
                max_limit,
            } => {
                format!(
                    "Request timeout out of range!\n\n\
                    Your configured value: {configured} seconds\n\
                    Valid range: {min_limit} - {max_limit} seconds\n\n\
                    Please update api.timeout_secs."
                )
            }
            ConfigValidationError::Adapter { configured } => {
                format!(
                    "Unknown store adapter!\n\n\
                    Your configured value: {configured}\n\
                    Valid values: remote, cached, local_database\n\n\
                    Please update store.adapter."
                )
            }
            ConfigValidationError::CacheTtl { configured, limit } => {
                format!(
                    "Cache TTL too high!\n\n\
                    Your configured value: {configured} seconds\n\
                    Maximum: {limit} seconds\n\n\
                    Please update store.cache_ttl_secs."
                )
            }
            ConfigValidationError::StorageKey { configured, limit } => {
                format!(
                    "Cache storage key is not usable!\n\n\
                    Your configured value: '{configured}'\n\
                    The key must be non-empty and at most {limit} characters.\n\n\
                    Please update store.cache_storage_key."
                )
            }
            ConfigValidationError::LogLevel { configured } => {
                format!(
                    "Unknown log level!\n\n\
                    Your configured value: {configured}\n\
                    Valid values: trace, debug, info, warn, error\n\n\
                    Please update logging.level."
                )
            }
        }
    }
}

/// Configuration loading result
#[derive(Debug)]
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
}
