//! Containment of failures raised by plugin code
//!
//! Registration functions, constructors and `init()` hooks run foreign code;
//! a panic in any of them is turned into a cause string so the discovery pass
//! can skip the offending item and carry on.
//!
//! A native plugin library links its own copy of the runtime, and the host
//! cannot catch an unwind started by it. `PluginHooks` and the registration
//! wrapper emitted by `export_plugins!` are built by the declaring library,
//! so the guards run there and only plain results cross back into the host.

use crate::plugin::error::BoxError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Why a guarded call into plugin code did not produce a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PluginFailure {
    Failed(String),
    Panicked(String),
}

impl PluginFailure {
    /// Cause text prefixed with the stage that failed
    pub(crate) fn describe(&self, stage: &str) -> String {
        match self {
            PluginFailure::Failed(cause) => format!("{} failed: {}", stage, cause),
            PluginFailure::Panicked(cause) => format!("{} panicked: {}", stage, cause),
        }
    }
}

/// Run a fallible plugin call, flattening its error and any panic into a [`PluginFailure`]
pub(crate) fn guard_plugin_call<T>(
    f: impl FnOnce() -> Result<T, BoxError>,
) -> Result<T, PluginFailure> {
    match catch_plugin_panic(f) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(PluginFailure::Failed(error.to_string())),
        Err(panic) => Err(PluginFailure::Panicked(panic)),
    }
}

/// Run plugin code, converting a panic into its message
pub(crate) fn catch_plugin_panic<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
