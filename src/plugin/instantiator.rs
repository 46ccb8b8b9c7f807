//! Construction of eligible plugin types

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::loader::LoadContext;
use crate::plugin::types::{PluginInstance, TypeDescriptor};

/// Builds plugin instances through a live load context
#[derive(Debug, Clone, Copy)]
pub struct PluginInstantiator<'a> {
    context: &'a LoadContext,
}

impl<'a> PluginInstantiator<'a> {
    pub fn new(context: &'a LoadContext) -> Self {
        Self { context }
    }

    /// Construct the type through its zero-argument constructor
    ///
    /// A type that cannot be built (no constructor, constructor error or
    /// panic) is logged, pushed to `diagnostics` and yields `Ok(None)`.
    /// Only a closed context is an error.
    pub fn try_instantiate(
        &self,
        descriptor: TypeDescriptor,
        diagnostics: &mut Vec<PluginError>,
    ) -> PluginResult<Option<PluginInstance>> {
        self.context.ensure_open()?;

        let constructed = match descriptor.hooks() {
            None => Err("type has no zero-argument constructor".to_string()),
            Some(hooks) => hooks
                .construct()
                .map(|plugin| (plugin, hooks.clone()))
                .map_err(|failure| failure.describe("constructor")),
        };

        match constructed {
            Ok((plugin, hooks)) => {
                log::debug!(
                    "Constructed plugin '{}' ({}) from '{}'",
                    plugin.name(),
                    descriptor.name(),
                    descriptor.origin()
                );
                Ok(Some(PluginInstance::new(plugin, hooks, descriptor)))
            }
            Err(cause) => {
                let error = PluginError::TypeInstantiationFailed {
                    type_name: descriptor.name().to_string(),
                    origin: descriptor.origin().path().to_path_buf(),
                    cause,
                };
                log::warn!("{}", error);
                diagnostics.push(error);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::error::BoxError;
    use crate::plugin::loader::IsolatedLoader;
    use crate::plugin::registrar::{PluginDeclaration, TypeDefinition, TypeRegistry};
    use crate::plugin::tests::utils::{SourceTable, TestPlugin};
    use crate::plugin::traits::Plugin;
    use crate::plugin::types::{Artifact, Capability};
    use std::sync::Arc;

    fn failing_constructor() -> Result<Box<dyn Plugin>, BoxError> {
        Err("database handle unavailable".into())
    }

    fn panicking_constructor() -> Result<Box<dyn Plugin>, BoxError> {
        panic!("constructor exploded")
    }

    fn register(registry: &mut TypeRegistry) {
        registry
            .register(
                TypeDefinition::plugin::<TestPlugin>("inst.Good").capability(Capability::MODULE),
            )
            .register(TypeDefinition::new("inst.NoCtor").capability(Capability::PLUGIN))
            .register(
                TypeDefinition::new("inst.Failing")
                    .capability(Capability::PLUGIN)
                    .constructor(failing_constructor),
            )
            .register(
                TypeDefinition::new("inst.Panicking")
                    .capability(Capability::PLUGIN)
                    .constructor(panicking_constructor),
            );
    }

    fn context() -> LoadContext {
        IsolatedLoader::new(Arc::new(
            SourceTable::new().with("inst", PluginDeclaration { register }),
        ))
        .open_all(&[Artifact::new("inst")])
    }

    fn descriptor(context: &LoadContext, name: &str) -> TypeDescriptor {
        context
            .all_types()
            .unwrap()
            .map(Result::unwrap)
            .find(|descriptor| descriptor.name() == name)
            .unwrap()
    }

    #[test]
    fn test_successful_construction_wraps_origin_and_capabilities() {
        let context = context();
        let mut diagnostics = Vec::new();

        let instance = PluginInstantiator::new(&context)
            .try_instantiate(descriptor(&context, "inst.Good"), &mut diagnostics)
            .unwrap()
            .unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(instance.type_name(), "inst.Good");
        assert_eq!(instance.origin(), &Artifact::new("inst"));
        assert!(instance.has_capability(&Capability::MODULE));
        assert!(instance.downcast_ref::<TestPlugin>().is_some());
    }

    #[test]
    fn test_soft_failures_are_recorded() {
        let context = context();
        let instantiator = PluginInstantiator::new(&context);
        let mut diagnostics = Vec::new();

        for name in ["inst.NoCtor", "inst.Failing", "inst.Panicking"] {
            let result = instantiator
                .try_instantiate(descriptor(&context, name), &mut diagnostics)
                .unwrap();
            assert!(result.is_none(), "{} should not construct", name);
        }

        assert_eq!(diagnostics.len(), 3);
        let causes: Vec<String> = diagnostics
            .iter()
            .map(|error| match error {
                PluginError::TypeInstantiationFailed { cause, .. } => cause.clone(),
                other => panic!("Expected TypeInstantiationFailed, got {:?}", other),
            })
            .collect();
        assert!(causes[0].contains("no zero-argument constructor"));
        assert!(causes[1].contains("database handle unavailable"));
        assert!(causes[2].contains("constructor exploded"));
    }

    #[test]
    fn test_closed_context_is_fatal() {
        let context = context();
        let descriptor = descriptor(&context, "inst.Good");
        context.close();

        let mut diagnostics = Vec::new();
        let result = PluginInstantiator::new(&context).try_instantiate(descriptor, &mut diagnostics);

        assert!(matches!(result, Err(PluginError::ContextClosed)));
        assert!(diagnostics.is_empty());
    }
}
