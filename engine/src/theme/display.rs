//! Display sink for applied themes.
//!
//! [`DisplayedTheme`] is the only writer of the document root. It renders a
//! [`ThemeConfig`] into a [`RenderedTheme`] (a concrete light/dark mode plus
//! the complete custom property set) and hands the whole frame to a
//! [`DocumentRoot`] in one call. `RenderedTheme` cannot be built outside this
//! crate, so a document root can only ever receive frames the engine rendered.

use super::css::{CssProperties, THEME_ATTRIBUTE, css_properties};
use crate::error::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use store::model::{ThemeConfig, ThemeMode};

/// The mode actually displayed. `Auto` never reaches the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Light,
    Dark,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Light => "light",
            DisplayMode::Dark => "dark",
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform color-scheme preference, consulted only for `Auto`.
pub trait ColorSchemeSource: Send + Sync {
    fn prefers_dark(&self) -> bool;
}

/// A fixed preference, e.g. from configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSchemePreference {
    prefers_dark: bool,
}

impl StaticSchemePreference {
    pub fn new(prefers_dark: bool) -> Self {
        Self { prefers_dark }
    }
}

impl ColorSchemeSource for StaticSchemePreference {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }
}

/// One complete display state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTheme {
    mode: DisplayMode,
    properties: CssProperties,
}

impl RenderedTheme {
    pub(crate) fn render(theme: &ThemeConfig, scheme: &dyn ColorSchemeSource) -> Self {
        let mode = match theme.mode {
            ThemeMode::Light => DisplayMode::Light,
            ThemeMode::Dark => DisplayMode::Dark,
            ThemeMode::Auto if scheme.prefers_dark() => DisplayMode::Dark,
            ThemeMode::Auto => DisplayMode::Light,
        };
        Self {
            mode,
            properties: css_properties(theme),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn properties(&self) -> &CssProperties {
        &self.properties
    }

    /// A `:root` stylesheet carrying the whole frame.
    pub fn to_stylesheet(&self) -> String {
        let mut css = format!(
            "/* {THEME_ATTRIBUTE}: {mode} */\n:root {{\n  color-scheme: {mode};\n",
            mode = self.mode
        );
        for (name, value) in &self.properties {
            css.push_str(&format!("  {name}: {value};\n"));
        }
        css.push_str("}\n");
        css
    }
}

/// Where rendered themes land. Each commit replaces the previous frame
/// entirely; properties absent from the new frame must disappear.
pub trait DocumentRoot: Send + Sync {
    fn commit(&self, frame: &RenderedTheme) -> AppResult<()>;
}

/// What an [`InMemoryDocument`] currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub attributes: CssProperties,
    pub properties: CssProperties,
}

impl DocumentSnapshot {
    pub fn theme_attribute(&self) -> Option<&str> {
        self.attributes.get(THEME_ATTRIBUTE).map(String::as_str)
    }
}

/// Document root held in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    state: Mutex<(Option<DocumentSnapshot>, usize)>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<DocumentSnapshot> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .0
            .clone()
    }

    /// Number of frames committed so far.
    pub fn commit_count(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).1
    }
}

impl DocumentRoot for InMemoryDocument {
    fn commit(&self, frame: &RenderedTheme) -> AppResult<()> {
        let mut attributes = CssProperties::new();
        attributes.insert(THEME_ATTRIBUTE.to_string(), frame.mode.as_str().to_string());

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.0 = Some(DocumentSnapshot {
            attributes,
            properties: frame.properties.clone(),
        });
        state.1 += 1;
        Ok(())
    }
}

/// Document root backed by a stylesheet file. The file is written next to
/// its destination and renamed into place, so readers see either the old
/// frame or the new one.
#[derive(Debug, Clone)]
pub struct StylesheetDocument {
    path: PathBuf,
}

impl StylesheetDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentRoot for StylesheetDocument {
    fn commit(&self, frame: &RenderedTheme) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Display(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let tmp_path = self.path.with_extension("css.tmp");
        fs::write(&tmp_path, frame.to_stylesheet()).map_err(|e| {
            AppError::Display(format!("Failed to write {}: {e}", tmp_path.display()))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            AppError::Display(format!("Failed to replace {}: {e}", self.path.display()))
        })
    }
}

/// The single writer of a [`DocumentRoot`].
pub struct DisplayedTheme {
    root: Arc<dyn DocumentRoot>,
    scheme: Arc<dyn ColorSchemeSource>,
    current: Mutex<Option<RenderedTheme>>,
}

impl DisplayedTheme {
    pub fn new(root: Arc<dyn DocumentRoot>, scheme: Arc<dyn ColorSchemeSource>) -> Self {
        Self {
            root,
            scheme,
            current: Mutex::new(None),
        }
    }

    /// Render and commit `theme`. Re-applying the frame already shown is a
    /// no-op.
    pub(crate) fn apply(&self, theme: &ThemeConfig) -> AppResult<DisplayMode> {
        let frame = RenderedTheme::render(theme, self.scheme.as_ref());
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if current.as_ref() == Some(&frame) {
            log::debug!("Theme already displayed, skipping commit");
            return Ok(frame.mode);
        }

        self.root.commit(&frame)?;
        log::debug!(
            "Displayed {} theme with {} properties",
            frame.mode,
            frame.properties.len()
        );
        let mode = frame.mode;
        *current = Some(frame);
        Ok(mode)
    }

    /// The frame last committed.
    pub fn current(&self) -> Option<RenderedTheme> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::model::{ColorValue, ThemeColors};

    fn display(prefers_dark: bool) -> (Arc<InMemoryDocument>, DisplayedTheme) {
        let document = Arc::new(InMemoryDocument::new());
        let displayed = DisplayedTheme::new(
            document.clone(),
            Arc::new(StaticSchemePreference::new(prefers_dark)),
        );
        (document, displayed)
    }

    fn theme_with(mode: ThemeMode, accent: Option<&str>) -> ThemeConfig {
        ThemeConfig {
            mode,
            colors: ThemeColors {
                accent: accent.map(ColorValue::solid),
                background: Some(ColorValue::solid("#ffffff")),
                ..ThemeColors::default()
            },
            ..ThemeConfig::default()
        }
    }

    #[test]
    fn test_auto_follows_scheme_preference() {
        let (document, displayed) = display(true);
        let mode = displayed.apply(&theme_with(ThemeMode::Auto, None)).unwrap();

        assert_eq!(mode, DisplayMode::Dark);
        let snapshot = document.snapshot().unwrap();
        assert_eq!(snapshot.theme_attribute(), Some("dark"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (document, displayed) = display(false);
        let theme = theme_with(ThemeMode::Light, Some("#f59e0b"));

        displayed.apply(&theme).unwrap();
        let first = document.snapshot();
        displayed.apply(&theme).unwrap();

        assert_eq!(document.snapshot(), first);
        assert_eq!(document.commit_count(), 1);
    }

    #[test]
    fn test_apply_replaces_whole_property_set() {
        let (document, displayed) = display(false);

        displayed
            .apply(&theme_with(ThemeMode::Light, Some("#f59e0b")))
            .unwrap();
        displayed.apply(&theme_with(ThemeMode::Dark, None)).unwrap();

        let snapshot = document.snapshot().unwrap();
        assert!(!snapshot.properties.contains_key("--color-accent"));
        assert_eq!(snapshot.properties["--color-background"], "#ffffff");
        assert_eq!(snapshot.theme_attribute(), Some("dark"));
    }

    #[test]
    fn test_stylesheet_document_writes_root_rule() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("theme").join("tillcfg.css");
        let displayed = DisplayedTheme::new(
            Arc::new(StylesheetDocument::new(&path)),
            Arc::new(StaticSchemePreference::default()),
        );

        displayed
            .apply(&theme_with(ThemeMode::Dark, Some("#f59e0b")))
            .unwrap();

        let css = fs::read_to_string(&path).unwrap();
        assert!(css.starts_with("/* data-theme: dark */"));
        assert!(css.contains("  color-scheme: dark;\n"));
        assert!(css.contains("  --color-accent: #f59e0b;\n"));
        assert!(!path.with_extension("css.tmp").exists());
    }
}
