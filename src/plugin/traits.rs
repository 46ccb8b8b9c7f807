//! Plugin Trait System
//!
//! The capability contract a loadable type implements. A plugin is a plain
//! value constructed through a zero-argument factory; the host calls its
//! `init()` hook exactly once before anyone else can see it.

use crate::plugin::error::BoxError;
use std::any::Any;

/// Upcast to `Any`, implemented for every sized `'static` type
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Base trait every plugin implements
///
/// Additional capabilities (language packs, record exporters, ...) are
/// declared on the type's registration, not through further traits, so the
/// host can query them without knowing the concrete type.
pub trait Plugin: AsAny + Send + Sync {
    /// Human readable plugin name
    fn name(&self) -> &str;

    fn author(&self) -> &str {
        ""
    }

    fn description(&self) -> &str {
        ""
    }

    fn version(&self) -> &str {
        ""
    }

    /// Lifecycle hook, called once after construction
    ///
    /// Returning an error (or panicking) excludes the plugin from the loaded
    /// set; other plugins are unaffected.
    fn init(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}
