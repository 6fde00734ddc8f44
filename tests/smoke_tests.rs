mod common;

use clap::Parser;
use common::scratch_dir;
use inkcal::cli::Args;
use inkcal::config::{AppPaths, PLACEHOLDER_API_KEY};
use inkcal::error::Error;
use inkcal::output::OutputSink;
use inkcal::startup::{build_sink, load_config};

/// A run without weather never touches inkcal.toml
#[test]
fn test_no_weather_skips_config_file() {
    let dir = scratch_dir();
    let config = load_config(AppPaths::new(dir.path()), false).unwrap();

    assert!(config.weather.is_none());
    assert!(!dir.join("inkcal.toml").exists());
}

/// First run writes the placeholder and stops
#[test]
fn test_first_run_creates_placeholder_config() {
    let dir = scratch_dir();
    assert!(load_config(AppPaths::new(dir.path()), true).is_err());

    let written = std::fs::read_to_string(dir.join("inkcal.toml")).unwrap();
    assert!(written.contains("[weather]"));
    assert!(written.contains(PLACEHOLDER_API_KEY));
}

#[test]
fn test_output_flag_picks_file_sink() {
    let args = Args::try_parse_from(["inkcal", "-o", "frame", "--width", "400", "--height", "300"])
        .unwrap();
    let sink = build_sink(&args).unwrap();

    assert!(!sink.is_hardware());
    assert_eq!(sink.dimensions(), (400, 300));
}

#[cfg(not(feature = "epd"))]
#[test]
fn test_hardware_mode_needs_driver() {
    let args = Args::try_parse_from(["inkcal"]).unwrap();
    match build_sink(&args) {
        Err(Error::Display(message)) => assert!(message.contains("--output")),
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("hardware sink without a driver"),
    }
}

#[tokio::test]
async fn test_headless_run_without_token_is_auth_error() {
    use inkcal::components::google_calendar::token::Authenticator;

    let dir = scratch_dir();
    let err = Authenticator::new(AppPaths::new(dir.path()), reqwest::Client::new())
        .interactive(false)
        .authenticate()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[test]
fn test_scratch_dir_is_removed_on_drop() {
    let dir = scratch_dir();
    let path = dir.to_path_buf();
    std::fs::write(dir.join("inkcal.toml"), "[weather]\n").unwrap();
    drop(dir);
    assert!(!path.exists());
}
