//! Integration tests for CLI argument handling
//!
//! Only paths that exit before the terminal is taken over are exercised here.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_weathernews"))
        .args(args)
        .output()
        .expect("Failed to execute weathernews")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("weathernews"), "Help should mention weathernews");
    assert!(stdout.contains("--section"), "Help should mention --section");
    assert!(stdout.contains("--theme"), "Help should mention --theme");
    assert!(stdout.contains("--base-url"), "Help should mention --base-url");
}

#[test]
fn test_version_flag() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_theme_is_rejected() {
    let output = run_cli(&["--theme", "sepia"]);
    assert!(!output.status.success(), "Expected invalid theme to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value"),
        "Should print clap's error about the theme: {}",
        stderr
    );
}

#[test]
fn test_unknown_section_prints_error_and_exits() {
    let output = run_cli(&["--section", "beaches"]);
    assert!(!output.status.success(), "Expected unknown section to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown section"),
        "Should print error message about the section: {}",
        stderr
    );
    assert!(stderr.contains("weather-map"), "Should list valid sections");
}

#[test]
fn test_invalid_base_url_prints_error_and_exits() {
    let output = run_cli(&["--base-url", "localhost:8000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid base URL"), "{}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use weathernews::cli::{parse_section_arg, Cli, StartupConfig};
    use weathernews::sections::SectionList;
    use weathernews::theme::Theme;

    #[test]
    fn test_startup_config_from_cli_with_everything() {
        let cli = Cli::parse_from([
            "weathernews",
            "--base-url",
            "https://weather.example.com/",
            "--section",
            "storm-news",
            "--theme",
            "dark",
            "--no-geolocation",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.base_url, "https://weather.example.com");
        assert_eq!(config.start_section, 5);
        assert_eq!(config.theme_override, Some(Theme::Dark));
        assert!(!config.geolocation);
    }

    #[test]
    fn test_every_home_section_is_addressable() {
        let sections = SectionList::home_page();
        for (i, id) in sections.ids().into_iter().enumerate() {
            assert_eq!(parse_section_arg(id, &sections).unwrap(), i);
        }
    }
}
