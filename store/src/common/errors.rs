use thiserror::Error;

/// Transport-level failures for requests against the configuration API.
///
/// Every variant carries owned strings so the error can be cloned, cached in
/// test transports and re-raised after a failed cache fallback without losing
/// context.
///
/// # Error Categories
///
/// ## Client Configuration Errors
/// - [`ClientCreation`] - HTTP client initialization failures
///
/// ## Request Execution Errors
/// - [`RequestFailed`] - Connection refused, DNS failure, reset streams
/// - [`Timeout`] - Request exceeded the configured timeout
///
/// ## Response Errors
/// - [`NotFound`] - The backend reported the resource does not exist
/// - [`Status`] - Any other non-success HTTP status
/// - [`InvalidResponse`] - The body could not be decoded
///
/// # Examples
///
/// ```no_run
/// use store::common::HttpError;
///
/// fn log_http_error(error: &HttpError) {
///     match error {
///         HttpError::Timeout { url, seconds } => {
///             log::warn!("Config request timeout: url={url}, duration={seconds}s");
///         }
///         HttpError::NotFound { url } => {
///             log::debug!("Config resource missing: {url}");
///         }
///         other => log::error!("Config request failed: {other}"),
///     }
/// }
/// ```
///
/// [`ClientCreation`]: HttpError::ClientCreation
/// [`RequestFailed`]: HttpError::RequestFailed
/// [`Timeout`]: HttpError::Timeout
/// [`NotFound`]: HttpError::NotFound
/// [`Status`]: HttpError::Status
/// [`InvalidResponse`]: HttpError::InvalidResponse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// HTTP client initialization failed.
    #[error("HTTP client creation failed: {reason}")]
    ClientCreation { reason: String },

    /// The request never produced a response.
    #[error("Request failed: {url} - {reason}")]
    RequestFailed { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("Request timeout after {seconds}s: {url}")]
    Timeout { url: String, seconds: u64 },

    /// The backend answered 404.
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// The backend answered with a non-success status other than 404.
    #[error("Request to {url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Received response doesn't match expected format.
    #[error("Invalid response: expected {expected}, got {actual}")]
    InvalidResponse { expected: String, actual: String },
}

impl HttpError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpError::NotFound { .. })
    }
}

/// Dimension of a theme that a store can lock against user overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockedDimension {
    Mode,
    Accent,
}

impl std::fmt::Display for LockedDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockedDimension::Mode => f.write_str("mode"),
            LockedDimension::Accent => f.write_str("accent color"),
        }
    }
}

/// Errors raised by configuration stores and the theme engine.
///
/// # Propagation policy
///
/// - [`Network`] propagates unless a caching layer holds a usable stale value,
///   in which case it is swallowed and logged as a warning.
/// - [`LockedField`] always propagates: it is a policy decision the user must
///   be told about.
/// - [`InvalidCache`] is recovered from internally (treated as a cache miss)
///   and only appears in logs.
///
/// [`Network`]: ConfigError::Network
/// [`LockedField`]: ConfigError::LockedField
/// [`InvalidCache`]: ConfigError::InvalidCache
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Setting '{key}' not found")]
    SettingNotFound { key: String },

    /// Writes are only accepted at store or user scope.
    #[error("Scope '{scope}' cannot be written; use 'store' or 'user'")]
    InvalidScope { scope: String },

    #[error("Missing required identifier: {field}")]
    MissingIdentifier { field: &'static str },

    #[error("The {dimension} is locked by your store and cannot be changed")]
    LockedField { dimension: LockedDimension },

    #[error("Theme engine has not been initialized with a store")]
    NotInitialized,

    #[error("A user id is required to save a user preference")]
    MissingUserId,

    #[error("Network error: {0}")]
    Network(#[from] HttpError),

    #[error("Cached data is invalid: {reason}")]
    InvalidCache { reason: String },

    #[error("Invalid theme: {reason}")]
    InvalidTheme { reason: String },

    #[error("{adapter} adapter does not implement {operation} yet")]
    NotImplemented {
        adapter: &'static str,
        operation: &'static str,
    },

    #[error("Failed to (de)serialize {context}: {reason}")]
    Serialization { context: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConfigError {
    /// Transport failures that a cache may hide.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConfigError::Network(_))
    }
}

/// Result alias for configuration store operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
