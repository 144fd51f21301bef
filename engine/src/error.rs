use std::fmt::Display;
use store::common::ConfigError;

/// Application-wide error type for the theme engine and the `tillcfg` binary.
///
/// # Error Categories
///
/// ## Store Errors
/// - [`AppError::Store`] - Everything raised by a `ConfigStore` or by engine
///   rules expressed in the store taxonomy (locks, missing session, invalid
///   theme). The wrapped [`ConfigError`] is kept intact so callers can match
///   on the exact variant.
///
/// ## Display Errors
/// - [`AppError::Display`] - A document root refused the rendered theme
///   (for example the stylesheet file could not be replaced).
///
/// ## System and Configuration Errors
/// - [`AppError::Config`] - Configuration loading and validation failures
/// - [`AppError::Io`] - File system failures outside the store
///
/// # Examples
///
/// ```no_run
/// use store::common::{ConfigError, LockedDimension};
/// use tillcfg::error::AppError;
///
/// fn explain(error: &AppError) -> String {
///     match error {
///         AppError::Store(ConfigError::LockedField { dimension }) => {
///             format!("Ask a store manager to unlock the {dimension}.")
///         }
///         other => other.to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Store, session and theme rule failures.
    Store(ConfigError),

    /// The document root could not commit a rendered theme.
    Display(String),

    /// Configuration loading and validation errors.
    Config(String),

    /// File system failures.
    Io(String),
}

impl AppError {
    /// The wrapped store error, if any.
    pub fn as_config_error(&self) -> Option<&ConfigError> {
        match self {
            AppError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Store(err) => write!(f, "{err}"),
            AppError::Display(msg) => write!(f, "Display Error: {msg}"),
            AppError::Config(msg) => write!(f, "Configuration Error: {msg}"),
            AppError::Io(msg) => write!(f, "IO Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Store(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use store::common::LockedDimension;

    #[test]
    fn test_store_errors_keep_their_message() {
        let err = AppError::from(ConfigError::LockedField {
            dimension: LockedDimension::Accent,
        });

        assert_eq!(
            err.to_string(),
            "The accent color is locked by your store and cannot be changed"
        );
        assert!(matches!(
            err.as_config_error(),
            Some(ConfigError::LockedField { .. })
        ));
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: AppError = io.into();
        assert_eq!(err.to_string(), "IO Error: read-only");
        assert!(err.as_config_error().is_none());
    }
}
