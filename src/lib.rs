//! Plugin discovery and lifecycle service for the catalog host
//!
//! Plugins are native shared libraries placed in one or more plugin
//! directories. Each library declares its types with
//! [`export_plugins!`]; [`plugin::api::PluginService`] finds the libraries,
//! loads each in its own namespace, constructs every eligible plugin once
//! and serves them by capability or by origin.

pub mod app;
pub mod core;
pub mod plugin;
