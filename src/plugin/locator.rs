//! Plugin artifact discovery
//!
//! Scans the configured directories, one level deep, for files with the
//! artifact extension. Directories that are missing or unreadable are
//! reported and skipped.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::{Artifact, Discovery};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Finds plugin artifacts inside scan directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    extension: String,
}

impl ArtifactLocator {
    /// Locator for files with the given extension (leading dot optional, case-insensitive)
    pub fn new(extension: impl AsRef<str>) -> Self {
        let extension = extension.as_ref();
        Self {
            extension: extension
                .strip_prefix('.')
                .unwrap_or(extension)
                .to_ascii_lowercase(),
        }
    }

    /// Locator for the platform's shared library extension
    pub fn native() -> Self {
        Self::new(std::env::consts::DLL_EXTENSION)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Enumerate the artifacts directly inside each directory
    ///
    /// The same file reached twice (a directory listed twice, or through a
    /// symlink) is returned once. Order follows the directory listing.
    pub fn locate(&self, directories: &[PathBuf]) -> Discovery<Artifact> {
        let mut discovery = Discovery::new();
        let mut seen = HashSet::new();

        for directory in directories {
            match self.scan_directory(directory) {
                Ok(paths) => {
                    for path in paths {
                        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                        if seen.insert(key) {
                            discovery.found.push(Artifact::new(path));
                        }
                    }
                }
                Err(error) => discovery.record(error),
            }
        }

        log::debug!(
            "Located {} plugin artifacts (*.{}) in {} directories",
            discovery.found.len(),
            self.extension,
            directories.len()
        );
        discovery
    }

    fn scan_directory(&self, directory: &Path) -> PluginResult<Vec<PathBuf>> {
        let unreadable = |cause: &str| PluginError::DirectoryUnreadable {
            path: directory.to_path_buf(),
            cause: cause.to_string(),
        };

        if !directory.exists() {
            return Err(unreadable("directory does not exist"));
        }
        if !directory.is_dir() {
            return Err(unreadable("not a directory"));
        }

        let entries = fs::read_dir(directory).map_err(|e| unreadable(&e.to_string()))?;

        let mut artifacts = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    log::warn!(
                        "Skipping unreadable entry in '{}': {}",
                        directory.display(),
                        e
                    );
                    continue;
                }
            };
            if path.is_file() && self.matches_extension(&path) {
                artifacts.push(path);
            }
        }
        Ok(artifacts)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case(&self.extension))
    }
}

impl Default for ArtifactLocator {
    fn default() -> Self {
        Self::native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    fn names(discovery: &Discovery<Artifact>) -> Vec<String> {
        let mut names: Vec<String> = discovery.found.iter().map(Artifact::file_name).collect();
        names.sort();
        names
    }

    #[test]
    fn test_extension_is_normalised() {
        assert_eq!(ArtifactLocator::new(".SO").extension(), "so");
        assert_eq!(ArtifactLocator::new("dll").extension(), "dll");
        assert_eq!(
            ArtifactLocator::native().extension(),
            std::env::consts::DLL_EXTENSION
        );
    }

    #[test]
    fn test_locates_matching_files_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "language.plugin");
        touch(dir.path(), "export.PLUGIN");
        touch(dir.path(), "readme.txt");
        touch(dir.path(), "noextension");

        let discovery = ArtifactLocator::new("plugin").locate(&[dir.path().to_path_buf()]);

        assert_eq!(names(&discovery), vec!["export.PLUGIN", "language.plugin"]);
        assert!(discovery.diagnostics.is_empty());
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "deep.plugin");
        fs::create_dir(dir.path().join("folder.plugin")).unwrap();

        let discovery = ArtifactLocator::new("plugin").locate(&[dir.path().to_path_buf()]);

        assert!(discovery.found.is_empty());
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "one.plugin");
        let missing = dir.path().join("does-not-exist");

        let discovery =
            ArtifactLocator::new("plugin").locate(&[missing.clone(), dir.path().to_path_buf()]);

        assert_eq!(names(&discovery), vec!["one.plugin"]);
        assert_eq!(discovery.diagnostics.len(), 1);
        assert!(matches!(
            &discovery.diagnostics[0],
            PluginError::DirectoryUnreadable { path, .. } if path == &missing
        ));
    }

    #[test]
    fn test_file_given_as_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "one.plugin");

        let discovery = ArtifactLocator::new("plugin").locate(&[file]);

        assert!(discovery.found.is_empty());
        assert!(matches!(
            &discovery.diagnostics[0],
            PluginError::DirectoryUnreadable { cause, .. } if cause == "not a directory"
        ));
    }

    #[test]
    fn test_duplicate_directories_do_not_duplicate_artifacts() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "one.plugin");
        let directory = dir.path().to_path_buf();

        let discovery =
            ArtifactLocator::new("plugin").locate(&[directory.clone(), directory.join(".")]);

        assert_eq!(discovery.found.len(), 1);
    }

    #[test]
    fn test_empty_directory_list() {
        let discovery = ArtifactLocator::native().locate(&[]);
        assert!(discovery.found.is_empty());
        assert!(discovery.diagnostics.is_empty());
    }
}
