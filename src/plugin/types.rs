//! Type definitions for the plugin system
//!
//! Artifacts, capabilities, type descriptors and constructed plugin instances,
//! plus the `Discovery` container that carries per-item failures alongside
//! successes through the discovery pass.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::native::Module;
use crate::plugin::registrar::{PluginHooks, TypeDefinition};
use crate::plugin::traits::Plugin;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One discoverable unit of plugin code: a library file found in a scan directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location the artifact was found at
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display, falling back to the full path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A named plugin-facing interface a type declares to satisfy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    /// Base capability every loadable plugin declares
    pub const PLUGIN: Capability = Capability::new("catalog.plugin");
    /// Supplies an additional user interface language
    pub const LANGUAGE: Capability = Capability::new("catalog.language");
    /// Exports catalog records to an external format
    pub const RECORD_EXPORT: Capability = Capability::new("catalog.record-export");
    /// Contributes a workspace module to the host window
    pub const MODULE: Capability = Capability::new("catalog.module");

    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Capability with a runtime-provided name
    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Copy a borrowed name onto the heap, detaching it from the library that declared it
    pub(crate) fn into_owned(self) -> Self {
        Self(Cow::Owned(self.0.into_owned()))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a declared type can be constructed at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    Abstract,
}

/// A candidate type resolved from an artifact's namespace
///
/// Holds a handle on the module it was declared by, so the constructor stays
/// callable for as long as the descriptor exists. Capability names are copied
/// out of the module and remain valid after it is unloaded.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    origin: Artifact,
    kind: TypeKind,
    capabilities: BTreeSet<Capability>,
    disabled: bool,
    hooks: Option<PluginHooks>,
    // Dropped after the hooks, whose code lives in the module.
    module: Arc<Module>,
}

impl TypeDescriptor {
    pub(crate) fn new(definition: TypeDefinition, origin: Artifact, module: Arc<Module>) -> Self {
        let (name, kind, capabilities, disabled, hooks) = definition.into_parts();
        Self {
            name,
            origin,
            kind,
            capabilities: capabilities.into_iter().map(Capability::into_owned).collect(),
            disabled,
            hooks,
            module,
        }
    }

    /// Name of the type, unique within its artifact
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &Artifact {
        &self.origin
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Concrete
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub(crate) fn hooks(&self) -> Option<&PluginHooks> {
        self.hooks.as_ref()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("kind", &self.kind)
            .field("capabilities", &self.capabilities)
            .field("disabled", &self.disabled)
            .field("has_constructor", &self.hooks.is_some())
            .finish()
    }
}

/// A constructed plugin together with where it came from and what it provides
pub struct PluginInstance {
    // Field order matters: the plugin value and hooks must be dropped while
    // their module is still mapped.
    plugin: Box<dyn Plugin>,
    hooks: PluginHooks,
    type_name: String,
    origin: Artifact,
    capabilities: BTreeSet<Capability>,
    _module: Arc<Module>,
}

impl PluginInstance {
    pub(crate) fn new(
        plugin: Box<dyn Plugin>,
        hooks: PluginHooks,
        descriptor: TypeDescriptor,
    ) -> Self {
        Self {
            plugin,
            hooks,
            type_name: descriptor.name,
            origin: descriptor.origin,
            capabilities: descriptor.capabilities,
            _module: descriptor.module,
        }
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    /// Registered type name the instance was constructed from
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn origin(&self) -> &Artifact {
        &self.origin
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Typed access to the concrete plugin value
    pub fn downcast_ref<T: Plugin + std::any::Any>(&self) -> Option<&T> {
        self.plugin.as_ref().as_any().downcast_ref::<T>()
    }

    /// Run the plugin's `init()` hook, converting errors and panics into a cause string
    pub(crate) fn initialize(&mut self) -> Result<(), String> {
        self.hooks
            .init(self.plugin.as_mut())
            .map_err(|failure| failure.describe("init()"))
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("name", &self.plugin.name())
            .field("type_name", &self.type_name)
            .field("origin", &self.origin)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Successes of a discovery stage plus the per-item failures it recovered from
#[derive(Debug)]
pub struct Discovery<T> {
    pub found: Vec<T>,
    pub diagnostics: Vec<PluginError>,
}

impl<T> Discovery<T> {
    pub fn new() -> Self {
        Self {
            found: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Log a recovered failure and keep it as a diagnostic
    pub fn record(&mut self, error: PluginError) {
        log::warn!("{}", error);
        self.diagnostics.push(error);
    }
}

impl<T> Default for Discovery<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<PluginResult<T>> for Discovery<T> {
    fn from_iter<I: IntoIterator<Item = PluginResult<T>>>(iter: I) -> Self {
        let mut discovery = Discovery::new();
        for item in iter {
            match item {
                Ok(found) => discovery.found.push(found),
                Err(error) => discovery.record(error),
            }
        }
        discovery
    }
}
