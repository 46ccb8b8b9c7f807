//! Module sources: how an artifact's code is brought into the process
//!
//! [`NativeModules`] maps shared libraries with `libloading`. On unix the
//! library is opened with `RTLD_LOCAL`, so its symbols never enter the global
//! namespace: a plugin cannot shadow host symbols and two plugins cannot
//! shadow each other. The only symbol the host looks up is the plugin
//! declaration.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::registrar::{PluginDeclaration, RegisterFn, TypeRegistry, DECLARATION_SYMBOL};
use crate::plugin::types::Artifact;
use std::fmt;
use std::path::Path;

/// Resolves an artifact into a loaded module
pub trait ModuleSource: Send + Sync {
    fn open(&self, artifact: &Artifact) -> PluginResult<Module>;
}

/// Code of one artifact, kept mapped for as long as the module is alive
pub struct Module {
    register: RegisterFn,
    // Dropped last; unmaps the library.
    library: Option<libloading::Library>,
}

impl Module {
    /// Module whose code is linked into the host binary
    pub fn linked(declaration: PluginDeclaration) -> Self {
        Self {
            register: declaration.register,
            library: None,
        }
    }

    fn native(declaration: PluginDeclaration, library: libloading::Library) -> Self {
        Self {
            register: declaration.register,
            library: Some(library),
        }
    }

    pub fn is_native(&self) -> bool {
        self.library.is_some()
    }

    /// Run the module's registration; a panic is recorded on the registry
    pub(crate) fn declare_types(&self, registry: &mut TypeRegistry) {
        registry.run_registration(self.register)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("native", &self.is_native())
            .finish()
    }
}

/// Loads artifacts as native shared libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeModules;

impl ModuleSource for NativeModules {
    fn open(&self, artifact: &Artifact) -> PluginResult<Module> {
        let unresolvable = |cause: String| PluginError::ArtifactUnresolvable {
            artifact: artifact.path().to_path_buf(),
            cause,
        };

        // SAFETY: loading a library runs its initialisers. Artifacts are
        // trusted code placed in the plugin directory by the user.
        let library = unsafe { open_isolated(artifact.path()) }
            .map_err(|e| unresolvable(e.to_string()))?;

        // SAFETY: the declaration symbol is exported by `export_plugins!`
        // with type `PluginDeclaration`; the value is copied out before the
        // symbol borrow ends.
        let declaration = unsafe {
            let symbol = library
                .get::<*const PluginDeclaration>(DECLARATION_SYMBOL)
                .map_err(|e| unresolvable(format!("no plugin declaration exported: {}", e)))?;
            if symbol.is_null() {
                return Err(unresolvable("plugin declaration is null".to_string()));
            }
            **symbol
        };

        log::debug!("Opened plugin library '{}'", artifact);
        Ok(Module::native(declaration, library))
    }
}

#[cfg(unix)]
unsafe fn open_isolated(path: &Path) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library, RTLD_LOCAL, RTLD_NOW};

    Library::open(Some(path), RTLD_NOW | RTLD_LOCAL).map(Into::into)
}

#[cfg(not(unix))]
unsafe fn open_isolated(path: &Path) -> Result<libloading::Library, libloading::Error> {
    libloading::Library::new(path)
}
