use once_cell::sync::Lazy;
use store::model::{
    ColorValue, ThemeAnimations, ThemeColors, ThemeConfig, ThemeFonts, ThemeMode, ThemeRadius,
    ThemeSpacing,
};

// Built-in palette used when neither the network nor the boot cache has a theme
mod fallback_colors {
    pub const PRIMARY: [(&str, &str); 11] = [
        ("50", "#eff6ff"),
        ("100", "#dbeafe"),
        ("200", "#bfdbfe"),
        ("300", "#93c5fd"),
        ("400", "#60a5fa"),
        ("500", "#3b82f6"),
        ("600", "#2563eb"),
        ("700", "#1d4ed8"),
        ("800", "#1e40af"),
        ("900", "#1e3a8a"),
        ("950", "#172554"),
    ];
    pub const SECONDARY: &str = "#64748b";
    pub const ACCENT: &str = "#f59e0b";
    pub const BACKGROUND: &str = "#ffffff";
    pub const SURFACE: &str = "#f8fafc";
    pub const TEXT: &str = "#0f172a";
    pub const SUCCESS: &str = "#16a34a";
    pub const WARNING: &str = "#d97706";
    pub const ERROR: &str = "#dc2626";
    pub const INFO: &str = "#0284c7";
}

static BUILT_IN_THEME: Lazy<ThemeConfig> = Lazy::new(|| ThemeConfig {
    mode: ThemeMode::Light,
    colors: ThemeColors {
        primary: Some(ColorValue::scale(fallback_colors::PRIMARY)),
        secondary: Some(ColorValue::solid(fallback_colors::SECONDARY)),
        accent: Some(ColorValue::solid(fallback_colors::ACCENT)),
        background: Some(ColorValue::solid(fallback_colors::BACKGROUND)),
        surface: Some(ColorValue::solid(fallback_colors::SURFACE)),
        text: Some(ColorValue::solid(fallback_colors::TEXT)),
        success: Some(ColorValue::solid(fallback_colors::SUCCESS)),
        warning: Some(ColorValue::solid(fallback_colors::WARNING)),
        error: Some(ColorValue::solid(fallback_colors::ERROR)),
        info: Some(ColorValue::solid(fallback_colors::INFO)),
    },
    fonts: Some(ThemeFonts {
        sans: Some("Inter, system-ui, sans-serif".to_string()),
        serif: Some("Georgia, serif".to_string()),
        mono: Some("ui-monospace, monospace".to_string()),
        heading: None,
    }),
    spacing: Some(ThemeSpacing {
        xs: Some("0.25rem".to_string()),
        sm: Some("0.5rem".to_string()),
        md: Some("1rem".to_string()),
        lg: Some("1.5rem".to_string()),
        xl: Some("2rem".to_string()),
    }),
    border_radius: Some(ThemeRadius {
        sm: Some("0.125rem".to_string()),
        md: Some("0.375rem".to_string()),
        lg: Some("0.5rem".to_string()),
        full: Some("9999px".to_string()),
    }),
    animations: Some(ThemeAnimations {
        enabled: Some(true),
        duration: Some("150ms".to_string()),
        easing: Some("ease-in-out".to_string()),
    }),
});

/// The theme shipped with the binary. Always complete and always valid.
pub fn built_in_theme() -> &'static ThemeConfig {
    &BUILT_IN_THEME
}

/// The built-in theme with `accent` replaced.
pub fn built_in_with_accent(accent: ColorValue) -> ThemeConfig {
    let mut theme = built_in_theme().clone();
    theme.colors.accent = Some(accent);
    theme
}
