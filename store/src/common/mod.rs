pub mod errors;

pub use errors::{ConfigError, ConfigResult, HttpError, LockedDimension};
