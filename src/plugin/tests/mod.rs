//! Test modules for the plugin system
//!
//! Service-level suites that span several plugin modules, plus shared
//! helpers. Module-local tests live next to their code.

pub(crate) mod utils;
