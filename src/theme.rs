//! Light/dark theme
//!
//! The theme is a plain value owned by the application and handed to the
//! components that depend on it. The preference is persisted through
//! [`crate::prefs::PreferenceStore`] under the key [`THEME_KEY`].

use clap::ValueEnum;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Preference key holding the theme
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parses a stored value; anything unrecognised is `None`
    pub fn parse(value: &str) -> Option<Theme> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::Rgb(240, 244, 248),
                text: Color::Rgb(44, 62, 80),
                muted: Color::Rgb(110, 120, 130),
                accent: Color::Rgb(37, 99, 235),
                border: Color::Rgb(160, 170, 180),
                error: Color::Rgb(200, 40, 40),
                highlight: Color::Rgb(225, 245, 254),
                map_land: Color::Rgb(90, 110, 90),
            },
            Theme::Dark => Palette {
                background: Color::Rgb(17, 24, 39),
                text: Color::Rgb(229, 231, 235),
                muted: Color::Rgb(140, 145, 155),
                accent: Color::Rgb(59, 130, 246),
                border: Color::Rgb(75, 85, 99),
                error: Color::Rgb(248, 113, 113),
                highlight: Color::Rgb(60, 60, 60),
                map_land: Color::Rgb(120, 140, 160),
            },
        }
    }
}

/// Colors used by the renderer for a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub error: Color,
    pub highlight: Color,
    pub map_land: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_light() {
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn test_parse_stored_values() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::parse(Theme::Dark.as_str()), Some(Theme::Dark));
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Theme::Light.palette(), Theme::Dark.palette());
    }
}
