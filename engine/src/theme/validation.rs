use crate::validation::Validator;
use store::common::ConfigError;
use store::model::{ColorValue, PartialThemeConfig, SHADE_STEPS, ThemeColors, ThemeConfig};

/// Longest accepted value for any single theme property.
const MAX_VALUE_LEN: usize = 200;

/// Validation errors specific to theme content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeValidationError {
    InvalidColor { slot: String, value: String },
    InvalidShade { slot: String, shade: String },
    EmptyScale { slot: String },
    InvalidValue { field: String, reason: String },
}

impl ThemeValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ThemeValidationError::InvalidColor { slot, value } => {
                format!("'{value}' is not a valid color for {slot}")
            }
            ThemeValidationError::InvalidShade { slot, shade } => {
                format!(
                    "Unknown shade '{shade}' in {slot}; expected one of {}",
                    SHADE_STEPS.join(", ")
                )
            }
            ThemeValidationError::EmptyScale { slot } => {
                format!("The color scale for {slot} has no shades")
            }
            ThemeValidationError::InvalidValue { field, reason } => {
                format!("Invalid value for {field}: {reason}")
            }
        }
    }
}

impl From<ThemeValidationError> for ConfigError {
    fn from(error: ThemeValidationError) -> Self {
        ConfigError::InvalidTheme {
            reason: error.user_message(),
        }
    }
}

/// Validator for raw CSS property values.
///
/// Values end up verbatim inside a stylesheet, so anything that could close
/// the declaration or the rule is rejected.
pub struct CssValueValidator;

impl Validator<str> for CssValueValidator {
    type Error = String;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("value cannot be empty".to_string());
        }
        if trimmed.len() > MAX_VALUE_LEN {
            return Err(format!("value too long (max {MAX_VALUE_LEN} characters)"));
        }
        if trimmed
            .chars()
            .any(|c| matches!(c, ';' | '{' | '}' | '<' | '>') || c.is_control())
        {
            return Err("value contains characters not allowed in CSS".to_string());
        }
        Ok(())
    }
}

/// Validator for a single CSS color.
///
/// Accepts hex notation, the color functions (`rgb()`, `oklch()`,
/// `color-mix()` and friends) with balanced nested arguments such as
/// `var(--token)`, and named colors.
pub struct CssColorValidator;

impl CssColorValidator {
    const FUNCTIONS: [&str; 13] = [
        "rgb", "rgba", "hsl", "hsla", "hwb", "lab", "lch", "oklab", "oklch", "color",
        "color-mix", "light-dark", "var",
    ];

    fn is_hex(value: &str) -> bool {
        value.strip_prefix('#').is_some_and(|digits| {
            matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        })
    }

    fn is_function(value: &str) -> bool {
        let Some((name, rest)) = value.split_once('(') else {
            return false;
        };
        let Some(args) = rest.strip_suffix(')') else {
            return false;
        };
        let name = name.trim().to_ascii_lowercase();
        Self::FUNCTIONS.contains(&name.as_str())
            && !args.trim().is_empty()
            && !args.contains(['"', '\'', '\\'])
            && Self::is_balanced(args)
    }

    /// Every `(` closed in order; nothing closes past the outer call.
    fn is_balanced(args: &str) -> bool {
        let mut depth = 0usize;
        for c in args.chars() {
            match c {
                '(' => depth += 1,
                ')' => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    None => return false,
                },
                _ => {}
            }
        }
        depth == 0
    }

    fn is_named(value: &str) -> bool {
        value.len() <= 30 && value.chars().all(|c| c.is_ascii_alphabetic())
    }
}

impl Validator<str> for CssColorValidator {
    type Error = String;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        CssValueValidator.validate(input)?;
        let value = input.trim();
        if Self::is_hex(value) || Self::is_function(value) || Self::is_named(value) {
            Ok(())
        } else {
            Err(format!("'{value}' is not a recognised color"))
        }
    }
}

/// Validator for every slot of a color set.
pub struct ThemeColorsValidator;

impl ThemeColorsValidator {
    fn validate_color(slot: String, value: &str) -> Result<(), ThemeValidationError> {
        CssColorValidator
            .validate(value)
            .map_err(|_| ThemeValidationError::InvalidColor {
                slot,
                value: value.to_string(),
            })
    }
}

impl Validator<ThemeColors> for ThemeColorsValidator {
    type Error = ThemeValidationError;

    fn validate(&self, input: &ThemeColors) -> Result<(), Self::Error> {
        for (slot, value) in input.slots() {
            match value {
                None => {}
                Some(ColorValue::Solid(color)) => Self::validate_color(slot.to_string(), color)?,
                Some(ColorValue::Scale(shades)) => {
                    if shades.is_empty() {
                        return Err(ThemeValidationError::EmptyScale {
                            slot: slot.to_string(),
                        });
                    }
                    for (shade, color) in shades {
                        if !SHADE_STEPS.contains(&shade.as_str()) {
                            return Err(ThemeValidationError::InvalidShade {
                                slot: slot.to_string(),
                                shade: shade.clone(),
                            });
                        }
                        Self::validate_color(format!("{slot}-{shade}"), color)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Validator for a partial theme as submitted for saving.
pub struct PartialThemeValidator;

impl PartialThemeValidator {
    fn validate_values<'a>(
        section: &str,
        values: impl IntoIterator<Item = (&'static str, Option<&'a String>)>,
    ) -> Result<(), ThemeValidationError> {
        for (name, value) in values {
            if let Some(value) = value {
                CssValueValidator.validate(value).map_err(|reason| {
                    ThemeValidationError::InvalidValue {
                        field: format!("{section}.{name}"),
                        reason,
                    }
                })?;
            }
        }
        Ok(())
    }
}

impl Validator<PartialThemeConfig> for PartialThemeValidator {
    type Error = ThemeValidationError;

    fn validate(&self, input: &PartialThemeConfig) -> Result<(), Self::Error> {
        if let Some(colors) = &input.colors {
            ThemeColorsValidator.validate(colors)?;
        }
        if let Some(fonts) = &input.fonts {
            Self::validate_values(
                "fonts",
                [
                    ("sans", fonts.sans.as_ref()),
                    ("serif", fonts.serif.as_ref()),
                    ("mono", fonts.mono.as_ref()),
                    ("heading", fonts.heading.as_ref()),
                ],
            )?;
        }
        if let Some(spacing) = &input.spacing {
            Self::validate_values(
                "spacing",
                [
                    ("xs", spacing.xs.as_ref()),
                    ("sm", spacing.sm.as_ref()),
                    ("md", spacing.md.as_ref()),
                    ("lg", spacing.lg.as_ref()),
                    ("xl", spacing.xl.as_ref()),
                ],
            )?;
        }
        if let Some(radius) = &input.border_radius {
            Self::validate_values(
                "borderRadius",
                [
                    ("sm", radius.sm.as_ref()),
                    ("md", radius.md.as_ref()),
                    ("lg", radius.lg.as_ref()),
                    ("full", radius.full.as_ref()),
                ],
            )?;
        }
        if let Some(animations) = &input.animations {
            Self::validate_values(
                "animations",
                [
                    ("duration", animations.duration.as_ref()),
                    ("easing", animations.easing.as_ref()),
                ],
            )?;
        }
        Ok(())
    }
}

/// Validator for a complete theme, e.g. one read back from the boot cache.
pub struct ThemeConfigValidator;

impl Validator<ThemeConfig> for ThemeConfigValidator {
    type Error = ThemeValidationError;

    fn validate(&self, input: &ThemeConfig) -> Result<(), Self::Error> {
        PartialThemeValidator.validate(&PartialThemeConfig::from(input.clone()))
    }
}
