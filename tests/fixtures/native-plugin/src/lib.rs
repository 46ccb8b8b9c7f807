//! Plugin library loaded by the native integration tests
//!
//! Declares one healthy plugin next to types whose constructor or `init()`
//! fails, plus an abstract and a disabled type. Registration panics when the
//! library file is named `panicking.*`.

use catalog_plugins::plugin::api::{BoxError, Capability, Plugin, TypeDefinition, TypeRegistry};

#[derive(Default)]
pub struct Greeter {
    greeting: String,
}

impl Plugin for Greeter {
    fn name(&self) -> &str {
        "Greeter"
    }

    fn description(&self) -> &str {
        &self.greeting
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self) -> Result<(), BoxError> {
        self.greeting = "Jó napot".to_string();
        Ok(())
    }
}

#[derive(Default)]
pub struct Boom;

impl Plugin for Boom {
    fn name(&self) -> &str {
        "Boom"
    }

    fn init(&mut self) -> Result<(), BoxError> {
        panic!("fixture init exploded")
    }
}

#[derive(Default)]
pub struct Unconfigured;

impl Plugin for Unconfigured {
    fn name(&self) -> &str {
        "Unconfigured"
    }

    fn init(&mut self) -> Result<(), BoxError> {
        Err("fixture settings missing".into())
    }
}

fn exploding() -> Result<Box<dyn Plugin>, BoxError> {
    panic!("fixture constructor exploded")
}

fn register(registry: &mut TypeRegistry) {
    let panicking = registry
        .origin()
        .path()
        .file_stem()
        .is_some_and(|stem| stem == "panicking");
    if panicking {
        panic!("fixture registration exploded");
    }

    registry
        .register(
            TypeDefinition::plugin::<Greeter>("fixture.Greeter")
                .capability(Capability::LANGUAGE)
                .capability(Capability::new("fixture.greeting")),
        )
        .register(TypeDefinition::plugin::<Boom>("fixture.Boom"))
        .register(
            TypeDefinition::new("fixture.Exploding")
                .capability(Capability::PLUGIN)
                .constructor(exploding),
        )
        .register(TypeDefinition::plugin::<Unconfigured>("fixture.Unconfigured"))
        .register(TypeDefinition::plugin::<Greeter>("fixture.Base").abstract_type())
        .register(TypeDefinition::plugin::<Greeter>("fixture.Retired").disabled());
}

catalog_plugins::export_plugins!(register);
