//! Integration tests for the application layer

use crate::app::report::PluginReport;
use crate::plugin::api::{
    PluginDeclaration, PluginError, PluginService, TypeDefinition, TypeRegistry,
};
use crate::plugin::tests::utils::{create_artifacts, InitTracking, SourceTable, TestPlugin};
use std::sync::Arc;
use tempfile::TempDir;

fn register_pack(registry: &mut TypeRegistry) {
    registry
        .register(TypeDefinition::plugin::<TestPlugin>("pack.Versioned"))
        .register(TypeDefinition::plugin::<InitTracking>("pack.Tracking"));
}

fn service(dir: &TempDir) -> PluginService {
    PluginService::builder()
        .directories(vec![dir.path().to_path_buf()])
        .extension("plugin")
        .module_source(Arc::new(
            SourceTable::new().with("pack", PluginDeclaration { register: register_pack }),
        ))
        .build()
}

#[test]
fn test_report_collects_per_artifact_plugins() {
    let dir = TempDir::new().unwrap();
    create_artifacts(dir.path(), &["pack.plugin", "stray.plugin"]);
    let service = service(&dir);

    let report = PluginReport::collect(&service).unwrap();

    assert_eq!(report.origin_count, 2);
    assert_eq!(report.plugin_count, 2);
    let pack = report
        .artifacts
        .iter()
        .find(|artifact| artifact.file_name == "pack.plugin")
        .unwrap();
    assert_eq!(pack.plugins, vec!["test-plugin 1.0.0", "init-tracking"]);
    let stray = report
        .artifacts
        .iter()
        .find(|artifact| artifact.file_name == "stray.plugin")
        .unwrap();
    assert!(stray.plugins.is_empty());
    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn test_report_on_closed_unloaded_service_fails() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    service.close();

    assert_eq!(
        PluginReport::collect(&service).unwrap_err(),
        PluginError::ContextClosed
    );
}

#[test]
fn test_report_renders_summary_from_service() {
    let dir = TempDir::new().unwrap();
    create_artifacts(dir.path(), &["pack.plugin"]);
    let service = service(&dir);

    let output = PluginReport::collect(&service).unwrap().render(false);

    assert!(output.contains("pack.plugin"));
    assert!(output.contains("2 plugins loaded from 1 artifacts"));
}
