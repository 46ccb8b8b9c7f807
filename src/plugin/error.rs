//! Plugin Error Handling
//!
//! Error types for locating, loading and instantiating plugins. Most of them
//! are recovered inside the discovery pass and reported as diagnostics; only
//! lifecycle misuse (`ContextClosed`) reaches callers as a hard error.

use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Boxed error returned by plugin constructors and `init()` hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PluginError {
    /// A configured scan directory is missing, not a directory, or unreadable
    #[error("Plugin directory '{}' is unreadable: {cause}", path.display())]
    DirectoryUnreadable { path: PathBuf, cause: String },

    /// An artifact (or one of its entries) could not be resolved into types
    #[error("Plugin artifact '{}' could not be resolved: {cause}", artifact.display())]
    ArtifactUnresolvable { artifact: PathBuf, cause: String },

    /// An eligible type failed to construct or its `init()` hook failed
    #[error("Plugin type '{type_name}' from '{}' failed to instantiate: {cause}", origin.display())]
    TypeInstantiationFailed {
        type_name: String,
        origin: PathBuf,
        cause: String,
    },

    /// The load context was used after `close()`
    #[error("Plugin load context is closed")]
    ContextClosed,

    /// Internal synchronisation failure
    #[error("Internal plugin service error: {message}")]
    Internal { message: String },
}

impl PluginError {
    /// Origin (directory or artifact path) the error refers to, if any
    pub fn origin(&self) -> Option<&std::path::Path> {
        match self {
            PluginError::DirectoryUnreadable { path, .. } => Some(path),
            PluginError::ArtifactUnresolvable { artifact, .. } => Some(artifact),
            PluginError::TypeInstantiationFailed { origin, .. } => Some(origin),
            PluginError::ContextClosed | PluginError::Internal { .. } => None,
        }
    }

    /// Whether this error is recovered locally during a discovery pass
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self,
            PluginError::DirectoryUnreadable { .. }
                | PluginError::ArtifactUnresolvable { .. }
                | PluginError::TypeInstantiationFailed { .. }
        )
    }
}

impl ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            PluginError::DirectoryUnreadable { .. } | PluginError::ArtifactUnresolvable { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        if self.is_user_actionable() {
            Some(self.to_string())
        } else {
            None
        }
    }
}
