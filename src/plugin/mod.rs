//! Plugin System Module
//!
//! Locates plugin libraries in the configured directories, loads each one in
//! its own namespace, filters the declared types for eligible plugins,
//! constructs and initialises them once, and serves the result through
//! [`api::PluginService`].

// Internal modules - all access should go through api module
pub(crate) mod error;
pub(crate) mod error_handling;
pub(crate) mod filter;
pub(crate) mod instantiator;
pub(crate) mod loader;
pub(crate) mod locator;
pub(crate) mod native;
pub(crate) mod registrar;
pub(crate) mod service;
pub(crate) mod settings;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
pub(crate) mod tests;
