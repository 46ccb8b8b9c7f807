//! Sample plugin library
//!
//! Build with `cargo build --release` inside this directory and copy the
//! resulting shared library into a plugin directory:
//!
//! ```text
//! catalog-plugins --plugin-dir target/release
//! ```

use catalog_plugins::plugin::api::{BoxError, Capability, Plugin, TypeDefinition, TypeRegistry};
use std::collections::HashMap;

/// Hungarian user interface strings
#[derive(Default)]
pub struct HungarianLanguage {
    strings: HashMap<&'static str, &'static str>,
}

impl HungarianLanguage {
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).copied().unwrap_or(key)
    }
}

impl Plugin for HungarianLanguage {
    fn name(&self) -> &str {
        "Hungarian"
    }

    fn author(&self) -> &str {
        "Catalog Team"
    }

    fn description(&self) -> &str {
        "Hungarian translation of the catalog user interface"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self) -> Result<(), BoxError> {
        self.strings.extend([
            ("catalog.title", "Katalógus"),
            ("catalog.search", "Keresés"),
            ("catalog.export", "Exportálás"),
        ]);
        Ok(())
    }
}

/// Work-in-progress exporter, registered but kept out of loading
#[derive(Default)]
pub struct MarcExport;

impl Plugin for MarcExport {
    fn name(&self) -> &str {
        "MARC export"
    }
}

fn register(registry: &mut TypeRegistry) {
    registry
        .register(
            TypeDefinition::plugin::<HungarianLanguage>("sample.HungarianLanguage")
                .capability(Capability::LANGUAGE),
        )
        .register(
            TypeDefinition::plugin::<MarcExport>("sample.MarcExport")
                .capability(Capability::RECORD_EXPORT)
                .disabled(),
        )
        .register(
            TypeDefinition::new("sample.LanguageBase")
                .capability(Capability::PLUGIN)
                .capability(Capability::LANGUAGE)
                .abstract_type(),
        );
}

catalog_plugins::export_plugins!(register);
