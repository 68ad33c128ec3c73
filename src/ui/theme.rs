use std::str::FromStr;

use ratatui::style::Color;

use crate::engine::config::ThemeConfig;
use crate::engine::GlanceError;

/// Reader colours. Defaults to the midnight palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub anchor: Color,
    pub dimmed: Color,
    pub surface: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::midnight()
    }
}

impl Theme {
    pub fn midnight() -> Self {
        Self {
            background: Color::Rgb(26, 27, 38), // #1A1B26 Stormy Dark
            text: Color::Rgb(169, 177, 214),    // #A9B1D6 Light Blue
            anchor: Color::Rgb(247, 118, 142),  // #F7768E Coral Red
            dimmed: Color::Rgb(100, 110, 150),  // #646E96 Dimmed Blue
            surface: Color::Rgb(36, 40, 59),    // #24283B
        }
    }

    /// Builds a theme from configured colour strings (`#RRGGBB` or names).
    pub fn from_config(config: &ThemeConfig) -> Result<Self, GlanceError> {
        Ok(Self {
            background: parse_color("theme.background_color", &config.background_color)?,
            text: parse_color("theme.text_color", &config.text_color)?,
            anchor: parse_color("theme.anchor_color", &config.anchor_color)?,
            dimmed: parse_color("theme.dimmed_color", &config.dimmed_color)?,
            ..Self::midnight()
        })
    }
}

fn parse_color(field: &str, value: &str) -> Result<Color, GlanceError> {
    Color::from_str(value).map_err(|_| GlanceError::InvalidSetting {
        field: field.to_string(),
        message: format!("{:?} is not a colour", value),
    })
}
