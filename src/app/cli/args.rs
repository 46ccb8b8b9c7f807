//! Command-line arguments
//!
//! Everything here is optional; unset values fall back to the configuration
//! file and then to built-in defaults (see [`super::config`]).

use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "catalog-plugins")]
#[command(about = "Discover, load and list catalog plugins")]
#[command(version)]
#[command(styles = crate::core::styles::palette_to_clap(true))]
#[command(after_help = " * can be specified multiple times")]
pub struct Args {
    /// Plugin directory to scan*
    #[arg(short = 'p', long = "plugin-dir", value_name = "DIR", action = ArgAction::Append)]
    pub plugin_dirs: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Plugin file extension (defaults to the platform library extension)
    #[arg(short = 'x', long = "extension", value_name = "EXT")]
    pub extension: Option<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(short = 'g', long = "color", overrides_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", overrides_with = "color")]
    pub no_color: bool,
}

impl Args {
    /// Parse from an explicit argument list (first item is the program name)
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Whether output should be coloured: explicit flags win, otherwise TTY detection
    pub fn color_enabled(&self) -> bool {
        if self.no_color {
            false
        } else if self.color {
            true
        } else {
            std::io::stdout().is_terminal()
        }
    }
}
