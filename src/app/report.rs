//! Plugin listing rendered for the terminal
//!
//! One table row per located artifact with the plugins it contributed,
//! followed by the collected diagnostics and a summary line.

use crate::core::styles::StyleRole;
use crate::plugin::api::{Artifact, PluginError, PluginInstance, PluginService};
use prettytable::{format, Cell, Row, Table};

/// One artifact and what it contributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub file_name: String,
    pub plugins: Vec<String>,
}

impl ArtifactSummary {
    fn from_instances(artifact: &Artifact, instances: &[&PluginInstance]) -> Self {
        Self {
            file_name: artifact.file_name(),
            plugins: instances
                .iter()
                .map(|instance| plugin_label(instance))
                .collect(),
        }
    }
}

/// Everything the report shows, collected from a loaded service
#[derive(Debug, Clone, PartialEq)]
pub struct PluginReport {
    pub artifacts: Vec<ArtifactSummary>,
    pub diagnostics: Vec<PluginError>,
    pub origin_count: usize,
    pub plugin_count: usize,
}

impl PluginReport {
    /// Collect the report, loading the service if needed
    pub fn collect(service: &PluginService) -> Result<Self, PluginError> {
        let plugin_count = service.all()?.len();

        let mut artifacts = Vec::with_capacity(service.origin_count());
        for artifact in service.artifacts() {
            let instances = service.of_origin(artifact)?;
            artifacts.push(ArtifactSummary::from_instances(artifact, &instances));
        }

        Ok(Self {
            artifacts,
            diagnostics: service.diagnostics(),
            origin_count: service.origin_count(),
            plugin_count,
        })
    }

    /// Report as text; the table itself is rendered without colour
    pub fn render(&self, use_color: bool) -> String {
        let mut output = match self.artifact_table(use_color) {
            Some(table) => table.to_string(),
            None => self.no_artifacts_line(use_color),
        };
        output.push_str(&self.footer(use_color));
        output
    }

    /// Write the report to stdout, colouring the table cells when enabled
    pub fn print(&self, use_color: bool) -> std::io::Result<()> {
        match self.artifact_table(use_color) {
            Some(table) if use_color => {
                table.print_tty(true)?;
            }
            Some(table) => {
                table.print(&mut std::io::stdout())?;
            }
            None => print!("{}", self.no_artifacts_line(use_color)),
        }
        print!("{}", self.footer(use_color));
        Ok(())
    }

    fn no_artifacts_line(&self, use_color: bool) -> String {
        format!(
            "{}\n",
            StyleRole::Dim.paint("No plugin artifacts found.", use_color)
        )
    }

    fn footer(&self, use_color: bool) -> String {
        let mut output = String::new();

        if !self.diagnostics.is_empty() {
            output.push('\n');
            output.push_str(&StyleRole::Header.paint("Problems:", use_color));
            output.push('\n');
            for diagnostic in &self.diagnostics {
                let role = if diagnostic.is_soft_failure() {
                    StyleRole::Warning
                } else {
                    StyleRole::Error
                };
                output.push_str(&format!("  {}\n", role.paint(&diagnostic.to_string(), use_color)));
            }
        }

        output.push('\n');
        output.push_str(&self.summary_line(use_color));
        output.push('\n');
        output
    }

    fn artifact_table(&self, use_color: bool) -> Option<Table> {
        if self.artifacts.is_empty() {
            return None;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.set_titles(Row::new(vec![
            styled_cell("Artifact", StyleRole::Header, use_color),
            styled_cell("Plugins", StyleRole::Header, use_color),
            styled_cell("Names", StyleRole::Header, use_color),
        ]));

        for artifact in &self.artifacts {
            let names = if artifact.plugins.is_empty() {
                styled_cell("-", StyleRole::Dim, use_color)
            } else {
                Cell::new(&artifact.plugins.join(", "))
            };
            table.add_row(Row::new(vec![
                styled_cell(&artifact.file_name, StyleRole::Key, use_color),
                Cell::new(&artifact.plugins.len().to_string()).style_spec("r"),
                names,
            ]));
        }
        Some(table)
    }

    fn summary_line(&self, use_color: bool) -> String {
        let problems = match self.diagnostics.len() {
            0 => String::new(),
            1 => ", 1 problem".to_string(),
            n => format!(", {} problems", n),
        };
        let line = format!(
            "{} plugins loaded from {} artifacts{}",
            self.plugin_count, self.origin_count, problems
        );
        let role = if self.diagnostics.is_empty() {
            StyleRole::Valid
        } else {
            StyleRole::Warning
        };
        role.paint(&line, use_color)
    }
}

fn plugin_label(instance: &PluginInstance) -> String {
    let plugin = instance.plugin();
    let name = if plugin.name().is_empty() {
        instance.type_name()
    } else {
        plugin.name()
    };
    if plugin.version().is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, plugin.version())
    }
}

fn styled_cell(text: &str, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec() {
        Some(spec) if use_color => cell.style_spec(&spec),
        _ => cell,
    }
}
