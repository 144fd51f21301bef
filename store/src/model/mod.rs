//! Value objects shared by every adapter and by the theme engine.

pub mod setting;
pub mod theme;

pub use setting::{ResolvedConfig, ResolvedMeta, Scope, ScopeContributions, SettingValue, TenantConfig};
pub use theme::{
    ColorValue, PartialThemeConfig, SHADE_STEPS, StoreThemeConfig, ThemeAnimations, ThemeColors,
    ThemeConfig, ThemeFonts, ThemeLocks, ThemeMode, ThemePreferences, ThemeRadius, ThemeSpacing,
};
