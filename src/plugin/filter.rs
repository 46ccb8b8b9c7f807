//! Eligibility filter for discovered types

use crate::plugin::types::{Capability, TypeDescriptor};

/// Decides whether a discovered type is a usable plugin
///
/// A type is eligible when it declares the required capability, is concrete
/// and is not disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFilter {
    required: Capability,
}

impl PluginFilter {
    pub fn new() -> Self {
        Self::requiring(Capability::PLUGIN)
    }

    /// Filter requiring a capability other than the base plugin capability
    pub fn requiring(required: Capability) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &Capability {
        &self.required
    }

    pub fn is_eligible(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.has_capability(&self.required)
            && descriptor.is_concrete()
            && !descriptor.is_disabled()
    }
}

impl Default for PluginFilter {
    fn default() -> Self {
        Self::new()
    }
}
