//! Application startup
//!
//! Stage 1 installs logging from the command line, stage 2 loads the
//! configuration file (which may raise the log level), stage 3 runs one
//! discovery pass and prints the report.

use crate::app::cli::args::Args;
use crate::app::cli::config::{resolve_settings, AppConfig};
use crate::app::report::PluginReport;
use crate::core::error_handling::{log_error_with_context, ContextualError};
use crate::core::logging::{init_logging, reconfigure_logging};
use crate::core::styles::StyleRole;
use crate::plugin::api::{PluginError, PluginService, SettingsError};
use clap::Parser;
use std::path::Path;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Cannot write report: {0}")]
    Output(#[from] std::io::Error),
}

impl ContextualError for StartupError {
    fn is_user_actionable(&self) -> bool {
        match self {
            StartupError::Settings(_) => true,
            StartupError::Plugin(error) => error.is_user_actionable(),
            StartupError::Output(_) => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        if self.is_user_actionable() {
            Some(self.to_string())
        } else {
            None
        }
    }
}

/// Parse the process arguments and run; returns the exit code
pub fn startup() -> i32 {
    run(&Args::parse())
}

pub fn run(args: &Args) -> i32 {
    let use_color = args.color_enabled();

    let log_file = args.log_file.as_deref().and_then(Path::to_str);
    if let Err(e) = init_logging(
        Some(args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)),
        args.log_format.as_deref(),
        log_file,
        use_color,
    ) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    match execute(args, use_color) {
        Ok(()) => 0,
        Err(error) => {
            log_error_with_context(&error, "Plugin discovery failed");
            eprintln!(
                "{}",
                StyleRole::Error.paint(&format!("Error: {}", error), use_color)
            );
            1
        }
    }
}

fn execute(args: &Args, use_color: bool) -> Result<(), StartupError> {
    let config = match AppConfig::discover(args.config_file.as_deref())? {
        Some((_, config)) => config,
        None => AppConfig::default(),
    };

    if args.log_level.is_none() {
        if let Some(level) = &config.logging.level {
            if let Err(e) = reconfigure_logging(level) {
                log::warn!("Cannot apply log level '{}' from configuration: {}", level, e);
            }
        }
    }

    let settings = resolve_settings(args, &config);
    log::info!(
        "Scanning {} plugin directories for *.{} files",
        settings.directories.len(),
        settings.extension
    );

    let service = PluginService::new(settings);
    let report = PluginReport::collect(&service)?;
    report.print(use_color)?;

    service.close();
    Ok(())
}
