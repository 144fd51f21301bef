//! Mapping from a theme to CSS custom properties.
//!
//! | theme field | property |
//! |---|---|
//! | solid color slot | `--color-<slot>` |
//! | scale color slot | `--color-<slot>-<shade>` |
//! | fonts | `--font-sans`, `--font-serif`, `--font-mono`, `--font-heading` |
//! | spacing | `--spacing-xs` .. `--spacing-xl` |
//! | border radius | `--radius-sm`, `--radius-md`, `--radius-lg`, `--radius-full` |
//! | animations | `--animation-duration`, `--animation-easing`, `--animations-enabled` (`1`/`0`) |

use std::collections::BTreeMap;
use store::model::{ColorValue, ThemeConfig};

/// Attribute on the document root carrying the display mode.
pub const THEME_ATTRIBUTE: &str = "data-theme";

pub type CssProperties = BTreeMap<String, String>;

/// Every custom property the theme defines. Undefined fields produce no
/// property, so applying a sparser theme removes what it no longer sets.
pub fn css_properties(theme: &ThemeConfig) -> CssProperties {
    let mut properties = CssProperties::new();

    for (slot, value) in theme.colors.slots() {
        match value {
            Some(ColorValue::Solid(color)) => {
                properties.insert(format!("--color-{slot}"), color.clone());
            }
            Some(ColorValue::Scale(shades)) => {
                for (shade, color) in shades {
                    properties.insert(format!("--color-{slot}-{shade}"), color.clone());
                }
            }
            None => {}
        }
    }

    let mut set = |name: &str, value: Option<&String>| {
        if let Some(value) = value {
            properties.insert(name.to_string(), value.clone());
        }
    };

    if let Some(fonts) = &theme.fonts {
        set("--font-sans", fonts.sans.as_ref());
        set("--font-serif", fonts.serif.as_ref());
        set("--font-mono", fonts.mono.as_ref());
        set("--font-heading", fonts.heading.as_ref());
    }
    if let Some(spacing) = &theme.spacing {
        set("--spacing-xs", spacing.xs.as_ref());
        set("--spacing-sm", spacing.sm.as_ref());
        set("--spacing-md", spacing.md.as_ref());
        set("--spacing-lg", spacing.lg.as_ref());
        set("--spacing-xl", spacing.xl.as_ref());
    }
    if let Some(radius) = &theme.border_radius {
        set("--radius-sm", radius.sm.as_ref());
        set("--radius-md", radius.md.as_ref());
        set("--radius-lg", radius.lg.as_ref());
        set("--radius-full", radius.full.as_ref());
    }
    if let Some(animations) = &theme.animations {
        set("--animation-duration", animations.duration.as_ref());
        set("--animation-easing", animations.easing.as_ref());
        if let Some(enabled) = animations.enabled {
            let flag = if enabled { "1" } else { "0" };
            properties.insert("--animations-enabled".to_string(), flag.to_string());
        }
    }

    properties
}
