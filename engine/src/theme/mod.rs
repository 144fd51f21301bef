//! # Theme System Module
//!
//! Layered theming for point-of-sale displays: a default theme, a store
//! layer that may lock some dimensions, and a user layer on top.
//!
//! ## Architecture
//!
//! - **[`resolve_theme`]** - Pure three-layer resolution with lock enforcement
//! - **[`ThemeEngine`]** - Session, remote fetch with fallbacks, saving and
//!   re-application
//! - **[`DisplayedTheme`]** - The single writer of a [`DocumentRoot`]
//! - **Boot sequence** - [`run_boot_sequence`] paints a first frame from the
//!   boot cache before any network call
//! - **Theme Validation** - Colors, shade keys and raw CSS values
//!
//! ## Basic Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use store::config_store::{StoreOptions, build_config_store};
//! use store::model::{PartialThemeConfig, Scope, ThemeMode};
//! use store::storage::MemoryStorage;
//! use tillcfg::theme::{DisplayedTheme, InMemoryDocument, StaticSchemePreference, ThemeEngine};
//!
//! # async fn example() -> tillcfg::error::AppResult<()> {
//! let storage = Arc::new(MemoryStorage::new());
//! let store = build_config_store(&StoreOptions::default(), storage.clone())?;
//! let display = DisplayedTheme::new(
//!     Arc::new(InMemoryDocument::new()),
//!     Arc::new(StaticSchemePreference::new(false)),
//! );
//!
//! let engine = ThemeEngine::new(store, storage, display);
//! engine.boot();
//! engine.initialize("store-1", Some("user-7")).await?;
//!
//! let dark = PartialThemeConfig {
//!     mode: Some(ThemeMode::Dark),
//!     ..PartialThemeConfig::default()
//! };
//! engine.save_theme_preference(Scope::User, dark).await?;
//! # Ok(())
//! # }
//! ```

pub mod boot;
pub mod css;
pub mod defaults;
pub mod display;
pub mod engine;
pub mod resolve;
pub mod validation;

pub use boot::{BootRecord, BootSource, load_cached_theme, run_boot_sequence, write_boot_cache};
pub use css::{THEME_ATTRIBUTE, css_properties};
pub use defaults::built_in_theme;
pub use display::{
    ColorSchemeSource, DisplayMode, DisplayedTheme, DocumentRoot, DocumentSnapshot,
    InMemoryDocument, RenderedTheme, StaticSchemePreference, StylesheetDocument,
};
pub use engine::{AppliedTheme, ThemeEngine, ThemeSource, check_locks};
pub use resolve::resolve_theme;
