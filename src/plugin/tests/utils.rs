//! Plugin Test Utilities
//!
//! Statically linked module sources and small plugin types shared by the
//! plugin test modules, so tests can exercise the whole discovery pass
//! without building shared libraries.

use crate::plugin::error::{BoxError, PluginError, PluginResult};
use crate::plugin::native::{Module, ModuleSource};
use crate::plugin::registrar::PluginDeclaration;
use crate::plugin::traits::Plugin;
use crate::plugin::types::Artifact;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Module source resolving artifacts by file stem to linked declarations
///
/// Unknown stems are unresolvable, like a file that is not a plugin library.
#[derive(Debug, Default)]
pub struct SourceTable {
    declarations: HashMap<String, PluginDeclaration>,
}

impl SourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stem: &str, declaration: PluginDeclaration) -> Self {
        self.declarations.insert(stem.to_string(), declaration);
        self
    }
}

impl ModuleSource for SourceTable {
    fn open(&self, artifact: &Artifact) -> PluginResult<Module> {
        let stem = artifact
            .path()
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.declarations
            .get(&stem)
            .map(|declaration| Module::linked(*declaration))
            .ok_or_else(|| PluginError::ArtifactUnresolvable {
                artifact: artifact.path().to_path_buf(),
                cause: "not a plugin library".to_string(),
            })
    }
}

/// Create empty artifact files in `dir`
pub fn create_artifacts(dir: &Path, file_names: &[&str]) -> Vec<PathBuf> {
    file_names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, b"").unwrap();
            path
        })
        .collect()
}

/// Plain plugin with no behaviour
#[derive(Debug, Default)]
pub struct TestPlugin;

impl Plugin for TestPlugin {
    fn name(&self) -> &str {
        "test-plugin"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }
}

/// Plugin that records whether `init()` ran
#[derive(Debug, Default)]
pub struct InitTracking {
    pub initialized: bool,
}

impl Plugin for InitTracking {
    fn name(&self) -> &str {
        "init-tracking"
    }

    fn init(&mut self) -> Result<(), BoxError> {
        self.initialized = true;
        Ok(())
    }
}

/// Plugin whose `init()` always fails
#[derive(Debug, Default)]
pub struct FailingInit;

impl Plugin for FailingInit {
    fn name(&self) -> &str {
        "failing-init"
    }

    fn init(&mut self) -> Result<(), BoxError> {
        Err("missing resource bundle".into())
    }
}

/// Plugin whose `init()` panics
#[derive(Debug, Default)]
pub struct PanickingInit;

impl Plugin for PanickingInit {
    fn name(&self) -> &str {
        "panicking-init"
    }

    fn init(&mut self) -> Result<(), BoxError> {
        panic!("init exploded")
    }
}
