//! Command-line interface parsing for weathernews
//!
//! Parses the arguments with clap and turns them into a [`StartupConfig`],
//! validating the starting section against the home page layout.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::sections::SectionList;
use crate::theme::Theme;

/// API root used when `--base-url` is not given
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested start section does not exist
    #[error("Unknown section: '{given}'. Valid sections: {valid}")]
    UnknownSection { given: String, valid: String },

    /// The API root is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// weathernews - Weather conditions, forecasts, a weather map and storm news
#[derive(Parser, Debug)]
#[command(name = "weathernews")]
#[command(about = "Weather conditions, forecasts, a weather map and storm news in the terminal")]
#[command(version)]
pub struct Cli {
    /// Root URL of the weather news API
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Section to open on start
    ///
    /// Examples:
    ///   weathernews --section weather-map
    ///   weathernews --section flood-news
    #[arg(long, value_name = "ID")]
    pub section: Option<String>,

    /// Color theme; the choice is saved for later runs
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,

    /// Skip the IP position lookup and center the map on the default city
    #[arg(long)]
    pub no_geolocation: bool,

    /// Write logs to this file instead of the cache directory
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub base_url: String,
    /// Index of the section to open on start
    pub start_section: usize,
    /// Theme to apply and save, overriding the stored one
    pub theme_override: Option<Theme>,
    pub geolocation: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_section: 0,
            theme_override: None,
            geolocation: true,
            log_file: None,
        }
    }
}

/// Resolves a section id against the home page layout
pub fn parse_section_arg(id: &str, sections: &SectionList) -> Result<usize, CliError> {
    sections
        .position(&id.trim().to_lowercase())
        .ok_or_else(|| CliError::UnknownSection {
            given: id.to_string(),
            valid: sections.ids().join(", "),
        })
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the section or base URL is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base_url = cli.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CliError::InvalidBaseUrl(cli.base_url.clone()));
        }

        let start_section = match &cli.section {
            Some(id) => parse_section_arg(id, &SectionList::home_page())?,
            None => 0,
        };

        Ok(StartupConfig {
            base_url,
            start_section,
            theme_override: cli.theme,
            geolocation: !cli.no_geolocation,
            log_file: cli.log_file.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["weathernews"]);
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert!(cli.section.is_none());
        assert!(cli.theme.is_none());
        assert!(!cli.no_geolocation);
    }

    #[test]
    fn test_startup_config_default_matches_no_args() {
        let cli = Cli::parse_from(["weathernews"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config, StartupConfig::default());
    }

    #[test]
    fn test_section_argument() {
        let cli = Cli::parse_from(["weathernews", "--section", "weather-map"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.start_section, 3);
    }

    #[test]
    fn test_section_argument_is_case_insensitive() {
        let cli = Cli::parse_from(["weathernews", "--section", "Flood-News"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.start_section, 6);
    }

    #[test]
    fn test_unknown_section_lists_valid_ids() {
        let cli = Cli::parse_from(["weathernews", "--section", "radar"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown section"));
        assert!(message.contains("radar"));
        assert!(message.contains("weather-map"));
    }

    #[test]
    fn test_theme_argument() {
        let cli = Cli::parse_from(["weathernews", "--theme", "dark"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.theme_override, Some(Theme::Dark));
    }

    #[test]
    fn test_invalid_theme_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["weathernews", "--theme", "sepia"]).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let cli = Cli::parse_from(["weathernews", "--base-url", "https://weather.example.com/"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.base_url, "https://weather.example.com");
    }

    #[test]
    fn test_base_url_without_scheme_is_rejected() {
        let cli = Cli::parse_from(["weathernews", "--base-url", "weather.example.com"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_no_geolocation_flag() {
        let cli = Cli::parse_from(["weathernews", "--no-geolocation"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(!config.geolocation);
    }

    #[test]
    fn test_log_file_argument() {
        let cli = Cli::parse_from(["weathernews", "--log-file", "/tmp/wn.log"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/wn.log")));
    }
}
