//! Tests for CLI argument parsing

use crate::app::cli::args::Args;
use std::path::PathBuf;

#[test]
fn test_no_arguments_uses_defaults() {
    let args = Args::parse_from_args(["catalog-plugins"]).unwrap();

    assert_eq!(args, Args::default());
}

#[test]
fn test_plugin_dir_is_repeatable() {
    let args = Args::parse_from_args([
        "catalog-plugins",
        "--plugin-dir",
        "/opt/catalog/plugins",
        "-p",
        "./plugins",
    ])
    .unwrap();

    assert_eq!(
        args.plugin_dirs,
        vec![PathBuf::from("/opt/catalog/plugins"), PathBuf::from("./plugins")]
    );
}

#[test]
fn test_logging_options() {
    let args = Args::parse_from_args([
        "catalog-plugins",
        "--log-level",
        "debug",
        "--log-format=json",
        "--log-file",
        "/tmp/catalog.log",
    ])
    .unwrap();

    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/catalog.log")));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let result = Args::parse_from_args(["catalog-plugins", "--log-level", "loud"]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_log_format_is_rejected() {
    let result = Args::parse_from_args(["catalog-plugins", "--log-format", "xml"]);
    assert!(result.is_err());
}

#[test]
fn test_config_file_and_extension() {
    let args = Args::parse_from_args([
        "catalog-plugins",
        "-c",
        "catalog.toml",
        "--extension",
        "plugin",
    ])
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("catalog.toml")));
    assert_eq!(args.extension.as_deref(), Some("plugin"));
}

#[test]
fn test_color_flags() {
    let forced = Args::parse_from_args(["catalog-plugins", "--color"]).unwrap();
    assert!(forced.color_enabled());

    let disabled = Args::parse_from_args(["catalog-plugins", "--no-color"]).unwrap();
    assert!(!disabled.color_enabled());

    // The last flag wins
    let both = Args::parse_from_args(["catalog-plugins", "--color", "--no-color"]).unwrap();
    assert!(!both.color_enabled());
    let reversed = Args::parse_from_args(["catalog-plugins", "--no-color", "--color"]).unwrap();
    assert!(reversed.color_enabled());
}
