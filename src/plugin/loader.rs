//! Isolated loading of plugin artifacts
//!
//! [`IsolatedLoader::open_all`] opens every located artifact through a
//! [`ModuleSource`] and returns one [`LoadContext`] owning the opened modules.
//! [`LoadContext::all_types`] walks the artifacts in order, giving each one a
//! fresh [`TypeRegistry`] and yielding the declared types. A failing artifact
//! or entry becomes an error item in the sequence; enumeration continues with
//! the rest.

use crate::core::sync::{handle_rwlock_read, handle_rwlock_write};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::native::{Module, ModuleSource, NativeModules};
use crate::plugin::registrar::TypeRegistry;
use crate::plugin::types::{Artifact, TypeDescriptor};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Opens artifacts into a shared, isolated load context
#[derive(Clone)]
pub struct IsolatedLoader {
    source: Arc<dyn ModuleSource>,
}

impl IsolatedLoader {
    pub fn new(source: Arc<dyn ModuleSource>) -> Self {
        Self { source }
    }

    /// Loader for native shared library artifacts
    pub fn native() -> Self {
        Self::new(Arc::new(NativeModules))
    }

    /// Open all artifacts; artifacts that fail to open are reported during enumeration
    pub fn open_all(&self, artifacts: &[Artifact]) -> LoadContext {
        let slots: Vec<Slot> = artifacts
            .iter()
            .map(|artifact| Slot {
                artifact: artifact.clone(),
                module: self.source.open(artifact).map(Arc::new),
            })
            .collect();

        log::debug!(
            "Opened load context: {} of {} artifacts resolved",
            slots.iter().filter(|slot| slot.module.is_ok()).count(),
            slots.len()
        );

        LoadContext {
            artifacts: artifacts.to_vec(),
            slots: RwLock::new(Some(slots)),
        }
    }
}

impl Default for IsolatedLoader {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Debug for IsolatedLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsolatedLoader").finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct Slot {
    artifact: Artifact,
    module: PluginResult<Arc<Module>>,
}

/// Owner of the modules opened for a set of artifacts
pub struct LoadContext {
    artifacts: Vec<Artifact>,
    // `None` once closed.
    slots: RwLock<Option<Vec<Slot>>>,
}

impl LoadContext {
    /// Artifacts the context was opened with
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn is_closed(&self) -> bool {
        match self.slots.read() {
            Ok(slots) => slots.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Fail with `ContextClosed` once the context has been closed
    pub fn ensure_open(&self) -> PluginResult<()> {
        if self.is_closed() {
            Err(PluginError::ContextClosed)
        } else {
            Ok(())
        }
    }

    /// Enumerate every type declared by the context's artifacts
    ///
    /// Each call starts a new walk and re-runs the artifacts' registration
    /// functions, so consume the sequence once.
    pub fn all_types(&self) -> PluginResult<TypeScan> {
        let guard = handle_rwlock_read(self.slots.read(), |message| PluginError::Internal {
            message,
        })?;
        let slots = guard.as_ref().ok_or(PluginError::ContextClosed)?;

        Ok(TypeScan {
            pending: slots.clone().into_iter(),
            buffered: VecDeque::new(),
        })
    }

    /// Release the context's module handles. Closing twice is a no-op.
    ///
    /// Descriptors and instances created earlier keep their own module
    /// handles; a library is unmapped once the last of them is dropped.
    pub fn close(&self) {
        let released = match handle_rwlock_write(self.slots.write(), |message| {
            PluginError::Internal { message }
        }) {
            Ok(mut slots) => slots.take(),
            Err(error) => {
                log::warn!("{}", error);
                None
            }
        };

        if let Some(slots) = released {
            log::debug!("Closed load context with {} artifacts", slots.len());
        }
    }
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("artifacts", &self.artifacts)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Lazy walk over the types declared by a context's artifacts
pub struct TypeScan {
    pending: std::vec::IntoIter<Slot>,
    buffered: VecDeque<PluginResult<TypeDescriptor>>,
}

impl Iterator for TypeScan {
    type Item = PluginResult<TypeDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(item);
            }
            let slot = self.pending.next()?;
            self.buffered = resolve_slot(slot);
        }
    }
}

fn resolve_slot(slot: Slot) -> VecDeque<PluginResult<TypeDescriptor>> {
    let Slot { artifact, module } = slot;
    let module = match module {
        Ok(module) => module,
        Err(error) => return VecDeque::from([Err(error)]),
    };

    let mut registry = TypeRegistry::new(artifact.clone());
    module.declare_types(&mut registry);

    let (definitions, rejected, panicked) = registry.into_parts();
    if let Some(panic) = panicked {
        return VecDeque::from([Err(PluginError::ArtifactUnresolvable {
            artifact: artifact.path().to_path_buf(),
            cause: format!("type registration panicked: {}", panic),
        })]);
    }
    log::debug!(
        "Artifact '{}' declares {} types ({} rejected)",
        artifact,
        definitions.len(),
        rejected.len()
    );

    rejected
        .into_iter()
        .map(Err)
        .chain(definitions.into_iter().map(|definition| {
            Ok(TypeDescriptor::new(
                definition,
                artifact.clone(),
                Arc::clone(&module),
            ))
        }))
        .collect()
}
