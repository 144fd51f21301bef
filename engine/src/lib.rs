//! # Tillcfg
//!
//! Layered configuration and theming for point-of-sale displays. Settings and
//! themes resolve through default, store and user layers; the store layer can
//! lock dimensions users may not override.
//!
//! ## Features
//!
//! - Pure theme resolution with mode and accent locks
//! - Offline operation through a persisted adapter cache
//! - A synchronous boot sequence that paints the last known theme before any
//!   network call
//! - Validated theme writes with last-writer-wins semantics
//!
//! ## Modules
//!
//! - [`config`] - Application configuration loading and validation
//! - [`error`] - Error types shared by the engine
//! - [`logger`] - Logging setup
//! - [`theme`] - Theme resolution, display and the theme engine
//! - [`validation`] - The validator trait
//!
//! The adapter chain itself lives in the `store` crate.

pub mod config;
pub mod error;
pub mod logger;
pub mod theme;
pub mod validation;

pub use error::{AppError, AppResult};
pub use theme::ThemeEngine;
pub use validation::Validator;
