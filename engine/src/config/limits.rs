/// Global limits for configuration values

/// Shortest accepted request timeout (seconds)
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Longest accepted request timeout (seconds)
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Longest accepted cache freshness window (one day)
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Longest accepted storage key for the persisted adapter cache
pub const MAX_STORAGE_KEY_LEN: usize = 128;

/// Default request timeout when none is configured
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Log levels understood by the logger
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
