use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shade steps accepted in a color scale, lightest to darkest.
pub const SHADE_STEPS: [&str; 11] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

/// Requested color mode. `Auto` defers to the platform preference when the
/// theme is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    Auto,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "auto" => Ok(ThemeMode::Auto),
            other => Err(format!("unknown theme mode '{other}'")),
        }
    }
}

/// A color slot value: one CSS color, or a shade scale keyed by [`SHADE_STEPS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Solid(String),
    Scale(BTreeMap<String, String>),
}

impl ColorValue {
    pub fn solid(color: impl Into<String>) -> Self {
        ColorValue::Solid(color.into())
    }

    pub fn scale<I, K, V>(shades: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ColorValue::Scale(
            shades
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The color used when a single representative value is needed: the
    /// solid color itself, or the 500 shade (falling back to the first shade).
    pub fn representative(&self) -> Option<&str> {
        match self {
            ColorValue::Solid(color) => Some(color.as_str()),
            ColorValue::Scale(shades) => shades
                .get("500")
                .or_else(|| shades.values().next())
                .map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemeColors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ColorValue>,
}

impl ThemeColors {
    /// Slot names paired with their values, in display order.
    pub fn slots(&self) -> [(&'static str, Option<&ColorValue>); 10] {
        [
            ("primary", self.primary.as_ref()),
            ("secondary", self.secondary.as_ref()),
            ("accent", self.accent.as_ref()),
            ("background", self.background.as_ref()),
            ("surface", self.surface.as_ref()),
            ("text", self.text.as_ref()),
            ("success", self.success.as_ref()),
            ("warning", self.warning.as_ref()),
            ("error", self.error.as_ref()),
            ("info", self.info.as_ref()),
        ]
    }

    /// Copy every slot defined in `overlay` over this set. Slots the overlay
    /// leaves undefined keep their current value.
    pub fn merge_from(&mut self, overlay: &ThemeColors) {
        fn take(target: &mut Option<ColorValue>, source: &Option<ColorValue>) {
            if let Some(value) = source {
                *target = Some(value.clone());
            }
        }

        take(&mut self.primary, &overlay.primary);
        take(&mut self.secondary, &overlay.secondary);
        take(&mut self.accent, &overlay.accent);
        take(&mut self.background, &overlay.background);
        take(&mut self.surface, &overlay.surface);
        take(&mut self.text, &overlay.text);
        take(&mut self.success, &overlay.success);
        take(&mut self.warning, &overlay.warning);
        take(&mut self.error, &overlay.error);
        take(&mut self.info, &overlay.info);
    }

    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|(_, value)| value.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemeFonts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sans: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serif: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemeSpacing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xl: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemeRadius {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemeAnimations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
}

/// A complete theme. Every resolved theme has a mode and a color set; the
/// remaining dimensions are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub mode: ThemeMode,
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<ThemeFonts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<ThemeSpacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<ThemeRadius>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<ThemeAnimations>,
}

/// A partial theme overlay, as stored at store or user scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialThemeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ThemeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<ThemeColors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<ThemeFonts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<ThemeSpacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<ThemeRadius>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<ThemeAnimations>,
}

impl PartialThemeConfig {
    /// Overlay every defined field onto `theme`. Colors merge slot by slot,
    /// the other dimensions replace wholesale.
    pub fn overlay_onto(&self, theme: &mut ThemeConfig) {
        if let Some(mode) = self.mode {
            theme.mode = mode;
        }
        if let Some(colors) = &self.colors {
            theme.colors.merge_from(colors);
        }
        if let Some(fonts) = &self.fonts {
            theme.fonts = Some(fonts.clone());
        }
        if let Some(spacing) = &self.spacing {
            theme.spacing = Some(spacing.clone());
        }
        if let Some(radius) = &self.border_radius {
            theme.border_radius = Some(radius.clone());
        }
        if let Some(animations) = &self.animations {
            theme.animations = Some(animations.clone());
        }
    }

    pub fn touches_mode(&self) -> bool {
        self.mode.is_some()
    }

    pub fn touches_accent(&self) -> bool {
        self.colors
            .as_ref()
            .is_some_and(|colors| colors.accent.is_some())
    }
}

impl From<ThemeConfig> for PartialThemeConfig {
    fn from(theme: ThemeConfig) -> Self {
        Self {
            mode: Some(theme.mode),
            colors: Some(theme.colors),
            fonts: theme.fonts,
            spacing: theme.spacing,
            border_radius: theme.border_radius,
            animations: theme.animations,
        }
    }
}

/// Store-imposed restrictions on user overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThemeLocks {
    #[serde(default)]
    pub lock_mode: bool,
    #[serde(default)]
    pub lock_accent: bool,
    /// Persisted for store administration; restricts no dimension yet.
    #[serde(default)]
    pub lock_contrast: bool,
}

/// The store-scope theme layer: a partial theme plus store administration
/// metadata that never reaches an applied theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoreThemeConfig {
    #[serde(flatten)]
    pub theme: PartialThemeConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locks: Option<ThemeLocks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl StoreThemeConfig {
    pub fn locks(&self) -> ThemeLocks {
        self.locks.unwrap_or_default()
    }
}

impl From<PartialThemeConfig> for StoreThemeConfig {
    fn from(theme: PartialThemeConfig) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }
}

/// The three resolution layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemePreferences {
    pub default: ThemeConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreThemeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PartialThemeConfig>,
}
