//! Common test utilities and helpers
//!
//! In-process plugin "libraries" for integration tests: a module source that
//! maps artifact file stems to statically linked declarations, plus a few
//! plugin types shaped like the ones a catalog host ships.

#![allow(dead_code)]

use catalog_plugins::plugin::api::{
    Artifact, BoxError, Capability, Module, ModuleSource, Plugin, PluginDeclaration, PluginError,
    PluginResult, PluginService, TypeDefinition, TypeRegistry,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const EXTENSION: &str = "plugin";

#[derive(Default)]
pub struct LinkedLibraries {
    declarations: HashMap<String, PluginDeclaration>,
}

impl LinkedLibraries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stem: &str, register: fn(&mut TypeRegistry)) -> Self {
        self.declarations
            .insert(stem.to_string(), PluginDeclaration { register });
        self
    }
}

impl ModuleSource for LinkedLibraries {
    fn open(&self, artifact: &Artifact) -> PluginResult<Module> {
        let stem = artifact
            .path()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        match self.declarations.get(stem) {
            Some(declaration) => Ok(Module::linked(*declaration)),
            None => Err(PluginError::ArtifactUnresolvable {
                artifact: artifact.path().to_path_buf(),
                cause: "unknown test library".to_string(),
            }),
        }
    }
}

/// Write an empty artifact file and return its path
pub fn artifact_file(dir: &Path, stem: &str) -> PathBuf {
    let path = dir.join(format!("{}.{}", stem, EXTENSION));
    std::fs::write(&path, b"").unwrap();
    path
}

pub fn service(directories: Vec<PathBuf>, libraries: LinkedLibraries) -> PluginService {
    PluginService::builder()
        .directories(directories)
        .extension(EXTENSION)
        .module_source(Arc::new(libraries))
        .build()
}

#[derive(Default)]
pub struct HungarianLanguage {
    pub ready: bool,
}

impl Plugin for HungarianLanguage {
    fn name(&self) -> &str {
        "Hungarian"
    }

    fn author(&self) -> &str {
        "Catalog Team"
    }

    fn version(&self) -> &str {
        "1.2.0"
    }

    fn init(&mut self) -> Result<(), BoxError> {
        self.ready = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct CsvExport;

impl Plugin for CsvExport {
    fn name(&self) -> &str {
        "CSV export"
    }
}

pub fn register_languages(registry: &mut TypeRegistry) {
    registry
        .register(
            TypeDefinition::plugin::<HungarianLanguage>("lang.Hungarian")
                .capability(Capability::LANGUAGE),
        )
        .register(TypeDefinition::plugin::<HungarianLanguage>("lang.Base").abstract_type());
}

pub fn register_exports(registry: &mut TypeRegistry) {
    registry.register(
        TypeDefinition::plugin::<CsvExport>("export.Csv").capability(Capability::RECORD_EXPORT),
    );
}

fn unavailable() -> Result<Box<dyn Plugin>, BoxError> {
    Err("export backend unavailable".into())
}

pub fn register_broken(registry: &mut TypeRegistry) {
    registry.register(
        TypeDefinition::new("broken.Export")
            .capability(Capability::PLUGIN)
            .constructor(unavailable),
    );
}
