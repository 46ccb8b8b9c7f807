//! Public API for the plugin system
//!
//! This module provides the complete public API for the plugin system.
//! Hosts and plugin libraries should import from here rather than directly
//! from internal modules.

// Service facade
pub use crate::plugin::service::{PluginService, PluginServiceBuilder, ServiceState};

// Error handling
pub use crate::plugin::error::{BoxError, PluginError, PluginResult};

// Plugin contract
pub use crate::plugin::traits::{AsAny, Plugin};

// Registration, used by plugin libraries
pub use crate::plugin::registrar::{
    PluginDeclaration, PluginFactory, RegisterFn, TypeDefinition, TypeRegistry,
    DECLARATION_SYMBOL,
};

// Discovered types and instances
pub use crate::plugin::types::{
    Artifact, Capability, Discovery, PluginInstance, TypeDescriptor, TypeKind,
};

// Discovery pipeline stages
pub use crate::plugin::filter::PluginFilter;
pub use crate::plugin::instantiator::PluginInstantiator;
pub use crate::plugin::loader::{IsolatedLoader, LoadContext, TypeScan};
pub use crate::plugin::locator::ArtifactLocator;
pub use crate::plugin::native::{Module, ModuleSource, NativeModules};

// Settings
pub use crate::plugin::settings::{
    default_config_file, default_plugin_directory, PluginSettings, SettingsError, APP_DIR_NAME,
    PLUGIN_DIR_ENV,
};
