//! Plugin registration contract
//!
//! A plugin library declares its types explicitly instead of having them
//! discovered by inspection. It exports one [`PluginDeclaration`] (normally
//! through [`export_plugins!`](crate::export_plugins)) whose `register`
//! function fills a [`TypeRegistry`]. Every artifact gets its own registry,
//! which is the namespace its type names live in.
//!
//! ```rust,ignore
//! use catalog_plugins::plugin::api::{Capability, Plugin, TypeDefinition, TypeRegistry};
//!
//! #[derive(Default)]
//! struct HungarianLanguage;
//!
//! impl Plugin for HungarianLanguage {
//!     fn name(&self) -> &str {
//!         "Hungarian language pack"
//!     }
//! }
//!
//! fn register(registry: &mut TypeRegistry) {
//!     registry.register(
//!         TypeDefinition::plugin::<HungarianLanguage>("lang.Hungarian")
//!             .capability(Capability::LANGUAGE),
//!     );
//! }
//!
//! catalog_plugins::export_plugins!(register);
//! ```

use crate::plugin::error::{BoxError, PluginError};
use crate::plugin::error_handling::{catch_plugin_panic, guard_plugin_call, PluginFailure};
use crate::plugin::traits::Plugin;
use crate::plugin::types::{Artifact, Capability, TypeKind};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Zero-argument constructor of a plugin type
pub type PluginFactory = fn() -> Result<Box<dyn Plugin>, BoxError>;

/// Registration entry point exported by a plugin library
pub type RegisterFn = fn(&mut TypeRegistry);

/// Name of the static every plugin library exports
pub const DECLARATION_SYMBOL: &[u8] = b"CATALOG_PLUGIN_DECLARATION\0";

/// The single item a plugin library exports
#[derive(Debug, Clone, Copy)]
pub struct PluginDeclaration {
    pub register: RegisterFn,
}

/// Export a plugin declaration from a `cdylib` crate
///
/// Takes the path of a `fn(&mut TypeRegistry)`. The exported entry point
/// catches a panic raised by the registration function inside the library
/// and reports it to the host as an unresolvable artifact.
#[macro_export]
macro_rules! export_plugins {
    ($register:path) => {
        #[doc(hidden)]
        #[no_mangle]
        pub static CATALOG_PLUGIN_DECLARATION: $crate::plugin::api::PluginDeclaration =
            $crate::plugin::api::PluginDeclaration {
                register: {
                    fn guarded_register(registry: &mut $crate::plugin::api::TypeRegistry) {
                        registry.run_registration($register);
                    }
                    guarded_register
                },
            };
    };
}

type ConstructHook = dyn Fn() -> Result<Box<dyn Plugin>, PluginFailure> + Send + Sync;
type InitHook = dyn Fn(&mut dyn Plugin) -> Result<(), PluginFailure> + Send + Sync;

/// Panic-guarded entry points into a plugin type
///
/// Built by whichever library runs the registration, so the guards unwind on
/// that library's runtime and only plain results reach the host.
#[derive(Clone)]
pub(crate) struct PluginHooks {
    construct: Arc<ConstructHook>,
    init: Arc<InitHook>,
}

impl PluginHooks {
    fn guarding(factory: PluginFactory) -> Self {
        Self {
            construct: Arc::new(move || guard_plugin_call(factory)),
            init: Arc::new(|plugin: &mut dyn Plugin| guard_plugin_call(|| plugin.init())),
        }
    }

    pub(crate) fn construct(&self) -> Result<Box<dyn Plugin>, PluginFailure> {
        (self.construct)()
    }

    pub(crate) fn init(&self, plugin: &mut dyn Plugin) -> Result<(), PluginFailure> {
        (self.init)(plugin)
    }
}

impl fmt::Debug for PluginHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHooks").finish_non_exhaustive()
    }
}

/// Declaration of one type inside an artifact
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    name: String,
    kind: TypeKind,
    capabilities: BTreeSet<Capability>,
    disabled: bool,
    hooks: Option<PluginHooks>,
}

impl TypeDefinition {
    /// A concrete type with no capabilities and no constructor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Concrete,
            capabilities: BTreeSet::new(),
            disabled: false,
            hooks: None,
        }
    }

    /// A plugin type constructed through its `Default` implementation
    pub fn plugin<T: Plugin + Default + 'static>(name: impl Into<String>) -> Self {
        Self::new(name)
            .capability(Capability::PLUGIN)
            .constructor(construct_default::<T>)
    }

    /// Mark the type as abstract; abstract types are never instantiated
    pub fn abstract_type(mut self) -> Self {
        self.kind = TypeKind::Abstract;
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Keep the type registered but exclude it from loading
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn constructor(mut self, factory: PluginFactory) -> Self {
        self.hooks = Some(PluginHooks::guarding(factory));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        TypeKind,
        BTreeSet<Capability>,
        bool,
        Option<PluginHooks>,
    ) {
        (
            self.name,
            self.kind,
            self.capabilities,
            self.disabled,
            self.hooks,
        )
    }
}

fn construct_default<T: Plugin + Default + 'static>() -> Result<Box<dyn Plugin>, BoxError> {
    Ok(Box::new(T::default()))
}

/// Per-artifact namespace that a plugin library registers its types into
#[derive(Debug)]
pub struct TypeRegistry {
    origin: Artifact,
    names: HashSet<String>,
    definitions: Vec<TypeDefinition>,
    rejected: Vec<PluginError>,
    panicked: Option<String>,
}

impl TypeRegistry {
    pub(crate) fn new(origin: Artifact) -> Self {
        Self {
            origin,
            names: HashSet::new(),
            definitions: Vec::new(),
            rejected: Vec::new(),
            panicked: None,
        }
    }

    /// Run a registration function, recording a panic instead of unwinding
    #[doc(hidden)]
    pub fn run_registration(&mut self, register: RegisterFn) {
        if let Err(panic) = catch_plugin_panic(|| register(&mut *self)) {
            self.panicked.get_or_insert(panic);
        }
    }

    /// Artifact this namespace belongs to
    pub fn origin(&self) -> &Artifact {
        &self.origin
    }

    /// Add a type to the namespace
    ///
    /// Entries with an empty or already registered name are rejected and
    /// reported once the artifact is enumerated.
    pub fn register(&mut self, definition: TypeDefinition) -> &mut Self {
        let cause = if definition.name.trim().is_empty() {
            Some("type registered with an empty name".to_string())
        } else if self.names.contains(&definition.name) {
            Some(format!("type '{}' registered twice", definition.name))
        } else {
            None
        };

        match cause {
            Some(cause) => self.rejected.push(PluginError::ArtifactUnresolvable {
                artifact: self.origin.path().to_path_buf(),
                cause,
            }),
            None => {
                self.names.insert(definition.name.clone());
                self.definitions.push(definition);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions, rejected entries and the panic message if registration panicked
    pub(crate) fn into_parts(self) -> (Vec<TypeDefinition>, Vec<PluginError>, Option<String>) {
        (self.definitions, self.rejected, self.panicked)
    }
}
