//! Three-layer theme resolution: default, then store, then user.

use store::model::{PartialThemeConfig, ThemeConfig, ThemeLocks, ThemePreferences};

/// Resolve the effective theme from its layers.
///
/// 1. Start from the default theme.
/// 2. Overlay every field the store layer defines.
/// 3. Overlay the user layer, except for dimensions the store has locked:
///    `lock_mode` drops the user's mode, `lock_accent` drops only the user's
///    accent color while the rest of their colors still apply.
///
/// Locks only restrict the user layer. Store administration fields (locks,
/// logo, company name) never reach the result. Pure and deterministic.
pub fn resolve_theme(preferences: &ThemePreferences) -> ThemeConfig {
    let mut theme = preferences.default.clone();

    let locks = match &preferences.store {
        Some(store) => {
            store.theme.overlay_onto(&mut theme);
            store.locks()
        }
        None => ThemeLocks::default(),
    };

    if let Some(user) = &preferences.user {
        restrict_to_unlocked(user, locks).overlay_onto(&mut theme);
    }

    theme
}

/// The part of a user overlay that survives the store's locks.
pub fn restrict_to_unlocked(user: &PartialThemeConfig, locks: ThemeLocks) -> PartialThemeConfig {
    let mut allowed = user.clone();
    if locks.lock_mode {
        allowed.mode = None;
    }
    if locks.lock_accent {
        if let Some(colors) = allowed.colors.as_mut() {
            colors.accent = None;
        }
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::css::css_properties;
    use crate::theme::defaults::built_in_theme;
    use store::model::{
        ColorValue, StoreThemeConfig, ThemeColors, ThemeFonts, ThemeMode, ThemeSpacing,
    };

    fn solid(color: &str) -> Option<ColorValue> {
        Some(ColorValue::solid(color))
    }

    fn store_layer(theme: PartialThemeConfig, locks: ThemeLocks) -> StoreThemeConfig {
        StoreThemeConfig {
            theme,
            locks: Some(locks),
            logo: Some("https://cdn.example.com/logo.svg".to_string()),
            company_name: Some("Corner Shop".to_string()),
        }
    }

    #[test]
    fn test_default_only() {
        let preferences = ThemePreferences {
            default: built_in_theme().clone(),
            ..ThemePreferences::default()
        };
        assert_eq!(resolve_theme(&preferences), *built_in_theme());
    }

    #[test]
    fn test_mode_lock_keeps_store_mode() {
        let preferences = ThemePreferences {
            default: ThemeConfig {
                mode: ThemeMode::Light,
                ..ThemeConfig::default()
            },
            store: Some(store_layer(
                PartialThemeConfig {
                    mode: Some(ThemeMode::Dark),
                    ..PartialThemeConfig::default()
                },
                ThemeLocks {
                    lock_mode: true,
                    ..ThemeLocks::default()
                },
            )),
            user: Some(PartialThemeConfig {
                mode: Some(ThemeMode::Light),
                ..PartialThemeConfig::default()
            }),
        };

        assert_eq!(resolve_theme(&preferences).mode, ThemeMode::Dark);
    }

    #[test]
    fn test_accent_lock_is_field_level() {
        let preferences = ThemePreferences {
            default: ThemeConfig {
                colors: ThemeColors {
                    accent: solid("#000000"),
                    background: solid("#ffffff"),
                    ..ThemeColors::default()
                },
                ..ThemeConfig::default()
            },
            store: Some(store_layer(
                PartialThemeConfig {
                    colors: Some(ThemeColors {
                        accent: solid("#ff0000"),
                        ..ThemeColors::default()
                    }),
                    ..PartialThemeConfig::default()
                },
                ThemeLocks {
                    lock_accent: true,
                    ..ThemeLocks::default()
                },
            )),
            user: Some(PartialThemeConfig {
                colors: Some(ThemeColors {
                    accent: solid("#00ff00"),
                    background: solid("#111111"),
                    ..ThemeColors::default()
                }),
                ..PartialThemeConfig::default()
            }),
        };

        let theme = resolve_theme(&preferences);
        assert_eq!(theme.colors.accent, solid("#ff0000"));
        assert_eq!(theme.colors.background, solid("#111111"));
    }

    #[test]
    fn test_locked_scale_accent_with_user_background() {
        let preferences = ThemePreferences {
            default: built_in_theme().clone(),
            store: Some(store_layer(
                PartialThemeConfig {
                    colors: Some(ThemeColors {
                        accent: Some(ColorValue::scale([("500", "#10b981"), ("600", "#059669")])),
                        ..ThemeColors::default()
                    }),
                    ..PartialThemeConfig::default()
                },
                ThemeLocks {
                    lock_accent: true,
                    ..ThemeLocks::default()
                },
            )),
            user: Some(PartialThemeConfig {
                colors: Some(ThemeColors {
                    accent: Some(ColorValue::scale([("500", "#ef4444"), ("600", "#dc2626")])),
                    background: solid("#000000"),
                    ..ThemeColors::default()
                }),
                ..PartialThemeConfig::default()
            }),
        };

        let theme = resolve_theme(&preferences);
        assert_eq!(
            theme.colors.accent,
            Some(ColorValue::scale([("500", "#10b981"), ("600", "#059669")]))
        );
        assert_eq!(theme.colors.background, solid("#000000"));
        assert_eq!(theme.colors.primary, built_in_theme().colors.primary);

        let properties = css_properties(&theme);
        assert_eq!(properties["--color-accent-500"], "#10b981");
        assert_eq!(properties["--color-accent-600"], "#059669");
        assert_eq!(properties["--color-background"], "#000000");
        assert!(!properties.contains_key("--color-accent"));
        assert!(properties.values().all(|v| v != "#ef4444" && v != "#dc2626"));
    }

    #[test]
    fn test_locks_never_restrict_store_over_default() {
        let preferences = ThemePreferences {
            default: ThemeConfig {
                mode: ThemeMode::Light,
                ..ThemeConfig::default()
            },
            store: Some(store_layer(
                PartialThemeConfig {
                    mode: Some(ThemeMode::Dark),
                    ..PartialThemeConfig::default()
                },
                ThemeLocks {
                    lock_mode: true,
                    lock_accent: true,
                    lock_contrast: true,
                },
            )),
            user: None,
        };

        assert_eq!(resolve_theme(&preferences).mode, ThemeMode::Dark);
    }

    #[test]
    fn test_non_color_dimensions_replace_wholesale() {
        let preferences = ThemePreferences {
            default: built_in_theme().clone(),
            store: Some(store_layer(
                PartialThemeConfig {
                    fonts: Some(ThemeFonts {
                        heading: Some("Playfair Display".to_string()),
                        ..ThemeFonts::default()
                    }),
                    ..PartialThemeConfig::default()
                },
                ThemeLocks::default(),
            )),
            user: Some(PartialThemeConfig {
                spacing: Some(ThemeSpacing {
                    md: Some("0.75rem".to_string()),
                    ..ThemeSpacing::default()
                }),
                ..PartialThemeConfig::default()
            }),
        };

        let theme = resolve_theme(&preferences);
        let fonts = theme.fonts.unwrap();
        assert_eq!(fonts.heading.as_deref(), Some("Playfair Display"));
        assert_eq!(fonts.sans, None);
        let spacing = theme.spacing.unwrap();
        assert_eq!(spacing.md.as_deref(), Some("0.75rem"));
        assert_eq!(spacing.xs, None);
    }

    #[test]
    fn test_absent_store_means_no_locks() {
        let preferences = ThemePreferences {
            default: ThemeConfig::default(),
            store: None,
            user: Some(PartialThemeConfig {
                mode: Some(ThemeMode::Auto),
                ..PartialThemeConfig::default()
            }),
        };

        assert_eq!(resolve_theme(&preferences).mode, ThemeMode::Auto);
    }
}
