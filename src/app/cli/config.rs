//! TOML configuration file loading and settings resolution
//!
//! The configuration file holds a `[plugins]` table (see
//! [`PluginSettings`]) and an optional `[logging]` table:
//!
//! ```toml
//! [plugins]
//! directories = ["/opt/catalog/plugins"]
//!
//! [logging]
//! level = "debug"
//! ```

use crate::plugin::api::{default_config_file, PluginSettings, SettingsError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::args::Args;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub plugins: PluginSettings,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load the configuration file to use, if any
    ///
    /// An explicitly named file must exist and parse. The platform default
    /// file is only read when present.
    pub fn discover(config_file: Option<&Path>) -> Result<Option<(PathBuf, Self)>, SettingsError> {
        let path = match config_file {
            Some(path) => path.to_path_buf(),
            None => match default_config_file() {
                Some(path) if path.is_file() => path,
                _ => return Ok(None),
            },
        };

        let config = Self::load(&path)?;
        log::debug!("Loaded configuration from '{}'", path.display());
        Ok(Some((path, config)))
    }
}

/// Plugin settings after applying command-line overrides and directory fallbacks
///
/// Directories: `--plugin-dir`, then the configuration file, then
/// `CATALOG_PLUGIN_DIR`, then the platform default directory.
pub fn resolve_settings(args: &Args, config: &AppConfig) -> PluginSettings {
    let mut settings = config.plugins.clone();

    if !args.plugin_dirs.is_empty() {
        settings.directories = args.plugin_dirs.clone();
    }
    if let Some(extension) = &args.extension {
        settings.extension = extension.clone();
    }

    settings.directories = settings.resolved_directories();
    settings
}
