//! Plugin Service
//!
//! Facade over the discovery pipeline. The first query runs a single
//! discovery pass (locate, load, filter, instantiate, `init()`) and caches
//! the resulting instances; every later query reads that cache.
//!
//! The service moves through `Unloaded -> Loading -> Loaded`, and to `Closed`
//! on [`PluginService::close`]. One caller performs the pass while concurrent
//! callers wait on a condition variable, so nobody observes a partially
//! filled cache. Once loaded, the cache is never mutated and is read without
//! taking the lifecycle lock.
//!
//! After `close()`, a service that finished loading keeps answering queries
//! from its cache; one that never loaded fails with `ContextClosed`.

use crate::core::sync::{handle_condvar_wait, handle_mutex_poison};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::filter::PluginFilter;
use crate::plugin::instantiator::PluginInstantiator;
use crate::plugin::loader::{IsolatedLoader, LoadContext};
use crate::plugin::locator::ArtifactLocator;
use crate::plugin::native::ModuleSource;
use crate::plugin::settings::PluginSettings;
use crate::plugin::types::{Artifact, Capability, Discovery, PluginInstance};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Lifecycle state of a [`PluginService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Unloaded,
    Loading,
    Loaded,
    Closed,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Unloaded => "unloaded",
            ServiceState::Loading => "loading",
            ServiceState::Loaded => "loaded",
            ServiceState::Closed => "closed",
        };
        f.write_str(name)
    }
}

struct Lifecycle {
    state: ServiceState,
    context: Option<LoadContext>,
}

struct LoadOutcome {
    context: LoadContext,
    plugins: Vec<PluginInstance>,
    diagnostics: Vec<PluginError>,
}

/// Discovers, instantiates and serves plugins from a set of directories
pub struct PluginService {
    directories: Vec<PathBuf>,
    locator: ArtifactLocator,
    loader: IsolatedLoader,
    filter: PluginFilter,
    located: OnceCell<Discovery<Artifact>>,
    lifecycle: Mutex<Lifecycle>,
    load_finished: Condvar,
    plugins: OnceCell<Vec<PluginInstance>>,
    load_diagnostics: OnceCell<Vec<PluginError>>,
}

impl PluginService {
    /// Service loading native plugin libraries as described by `settings`
    pub fn new(settings: PluginSettings) -> Self {
        Self::builder().settings(settings).build()
    }

    pub fn builder() -> PluginServiceBuilder {
        PluginServiceBuilder::default()
    }

    /// Directories this service scans
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn state(&self) -> ServiceState {
        match self.lifecycle.lock() {
            Ok(lifecycle) => lifecycle.state,
            Err(poisoned) => poisoned.into_inner().state,
        }
    }

    /// Run the discovery pass unless it already ran
    ///
    /// Concurrent callers block until the pass started by the first caller
    /// has finished. Fails with `ContextClosed` after `close()` if the
    /// service never loaded.
    pub fn load(&self) -> PluginResult<()> {
        if self.plugins.get().is_some() {
            return Ok(());
        }

        let mut lifecycle = self.lock_lifecycle()?;
        loop {
            let state = lifecycle.state;
            match state {
                ServiceState::Loaded => return Ok(()),
                ServiceState::Closed => return Err(PluginError::ContextClosed),
                ServiceState::Loading => {
                    lifecycle = handle_condvar_wait(&self.load_finished, lifecycle, internal)?
                }
                ServiceState::Unloaded => break,
            }
        }
        lifecycle.state = ServiceState::Loading;
        drop(lifecycle);

        let reset = ResetOnUnwind { service: self };
        let outcome = self.discover();
        std::mem::forget(reset);

        let mut lifecycle = self.lock_lifecycle()?;
        let result = match outcome {
            Ok(LoadOutcome {
                context,
                plugins,
                diagnostics,
            }) => {
                // Only the caller that moved the state to `Loading` gets here.
                let stored = self.plugins.set(plugins).is_ok();
                debug_assert!(stored, "plugin cache filled twice");
                let stored = self.load_diagnostics.set(diagnostics).is_ok();
                debug_assert!(stored, "load diagnostics filled twice");
                lifecycle.context = Some(context);
                lifecycle.state = ServiceState::Loaded;
                Ok(())
            }
            Err(error) => {
                lifecycle.state = ServiceState::Unloaded;
                Err(error)
            }
        };
        self.load_finished.notify_all();
        result
    }

    /// All loaded plugins, loading them first if needed
    pub fn all(&self) -> PluginResult<&[PluginInstance]> {
        self.load()?;
        Ok(self.plugins.get().map(Vec::as_slice).unwrap_or_default())
    }

    /// Loaded plugins declaring `capability`
    pub fn of_capability(&self, capability: &Capability) -> PluginResult<Vec<&PluginInstance>> {
        Ok(self
            .all()?
            .iter()
            .filter(|instance| instance.has_capability(capability))
            .collect())
    }

    /// Loaded plugins that came from `artifact`
    pub fn of_origin(&self, artifact: &Artifact) -> PluginResult<Vec<&PluginInstance>> {
        Ok(self
            .all()?
            .iter()
            .filter(|instance| instance.origin() == artifact)
            .collect())
    }

    /// Artifacts found in the scan directories
    ///
    /// Only locates files; nothing is loaded.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.located().found
    }

    /// Number of artifacts found, whether or not they resolve
    pub fn origin_count(&self) -> usize {
        self.artifacts().len()
    }

    /// Every failure recovered from so far: unreadable directories,
    /// unresolvable artifacts and plugins that failed to construct or initialise
    pub fn diagnostics(&self) -> Vec<PluginError> {
        let mut diagnostics = self
            .located
            .get()
            .map(|located| located.diagnostics.clone())
            .unwrap_or_default();
        if let Some(load_diagnostics) = self.load_diagnostics.get() {
            diagnostics.extend(load_diagnostics.iter().cloned());
        }
        diagnostics
    }

    /// Release the load context and refuse any further loading
    ///
    /// Safe to call at any time and any number of times. A pass in progress
    /// is allowed to finish first.
    pub fn close(&self) {
        let mut lifecycle = match self.lifecycle.lock() {
            Ok(lifecycle) => lifecycle,
            Err(poisoned) => poisoned.into_inner(),
        };
        while lifecycle.state == ServiceState::Loading {
            lifecycle = match self.load_finished.wait(lifecycle) {
                Ok(lifecycle) => lifecycle,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        if lifecycle.state == ServiceState::Closed {
            return;
        }

        if let Some(context) = lifecycle.context.take() {
            context.close();
        }
        lifecycle.state = ServiceState::Closed;
        self.load_finished.notify_all();
        log::debug!("Plugin service closed");
    }

    fn located(&self) -> &Discovery<Artifact> {
        self.located
            .get_or_init(|| self.locator.locate(&self.directories))
    }

    fn lock_lifecycle(&self) -> PluginResult<MutexGuard<'_, Lifecycle>> {
        handle_mutex_poison(self.lifecycle.lock(), internal)
    }

    fn discover(&self) -> PluginResult<LoadOutcome> {
        let context = self.loader.open_all(self.artifacts());
        let instantiator = PluginInstantiator::new(&context);
        let mut diagnostics = Vec::new();
        let mut plugins: Vec<PluginInstance> = Vec::new();
        let mut origins_by_type: HashMap<String, Artifact> = HashMap::new();

        for item in context.all_types()? {
            let descriptor = match item {
                Ok(descriptor) => descriptor,
                Err(error) => {
                    log::warn!("{}", error);
                    diagnostics.push(error);
                    continue;
                }
            };

            if !self.filter.is_eligible(&descriptor) {
                log::trace!("Ignoring type '{}': not a loadable plugin", descriptor.name());
                continue;
            }
            log::debug!(
                "Found plugin type '{}' in '{}'",
                descriptor.name(),
                descriptor.origin()
            );

            let Some(mut instance) = instantiator.try_instantiate(descriptor, &mut diagnostics)?
            else {
                continue;
            };

            if let Err(cause) = instance.initialize() {
                let error = PluginError::TypeInstantiationFailed {
                    type_name: instance.type_name().to_string(),
                    origin: instance.origin().path().to_path_buf(),
                    cause,
                };
                log::warn!("{}", error);
                diagnostics.push(error);
                continue;
            }

            if let Some(previous) =
                origins_by_type.insert(instance.type_name().to_string(), instance.origin().clone())
            {
                log::debug!(
                    "Type '{}' is provided by both '{}' and '{}'; keeping both",
                    instance.type_name(),
                    previous,
                    instance.origin()
                );
            }
            plugins.push(instance);
        }

        log::info!(
            "Loaded {} plugins from {} artifacts ({} problems)",
            plugins.len(),
            context.artifacts().len(),
            diagnostics.len()
        );

        Ok(LoadOutcome {
            context,
            plugins,
            diagnostics,
        })
    }
}

impl fmt::Debug for PluginService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginService")
            .field("directories", &self.directories)
            .field("extension", &self.locator.extension())
            .field("state", &self.state())
            .field("plugins", &self.plugins.get().map(Vec::len))
            .finish()
    }
}

fn internal(message: String) -> PluginError {
    PluginError::Internal { message }
}

// Puts the service back to `Unloaded` if the discovery pass unwinds, so
// waiting callers are released instead of blocking forever.
struct ResetOnUnwind<'a> {
    service: &'a PluginService,
}

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        let mut lifecycle = match self.service.lifecycle.lock() {
            Ok(lifecycle) => lifecycle,
            Err(poisoned) => poisoned.into_inner(),
        };
        lifecycle.state = ServiceState::Unloaded;
        self.service.load_finished.notify_all();
    }
}

/// Builder for [`PluginService`]
#[derive(Default)]
pub struct PluginServiceBuilder {
    settings: PluginSettings,
    source: Option<Arc<dyn ModuleSource>>,
    filter: PluginFilter,
}

impl PluginServiceBuilder {
    pub fn settings(mut self, settings: PluginSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn directories(mut self, directories: Vec<PathBuf>) -> Self {
        self.settings.directories = directories;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.settings.extension = extension.into();
        self
    }

    /// Replace the native library loader, e.g. with statically linked modules
    pub fn module_source(mut self, source: Arc<dyn ModuleSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn filter(mut self, filter: PluginFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn build(self) -> PluginService {
        let loader = match self.source {
            Some(source) => IsolatedLoader::new(source),
            None => IsolatedLoader::native(),
        };

        PluginService {
            directories: self.settings.directories,
            locator: ArtifactLocator::new(&self.settings.extension),
            loader,
            filter: self.filter,
            located: OnceCell::new(),
            lifecycle: Mutex::new(Lifecycle {
                state: ServiceState::Unloaded,
                context: None,
            }),
            load_finished: Condvar::new(),
            plugins: OnceCell::new(),
            load_diagnostics: OnceCell::new(),
        }
    }
}
