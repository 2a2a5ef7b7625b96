use std::path::Path;

use modcat::{DependencyGraph, ModuleCode};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Only show this module's dependents
    #[arg(value_parser = super::parse_code)]
    code: Option<ModuleCode>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, storage) = super::open_storage(root);
        let catalog = storage.load_modules().value;
        let graph = DependencyGraph::build(&catalog);

        let entries: Vec<(&ModuleCode, &Vec<ModuleCode>)> = match &self.code {
            Some(code) => graph
                .iter()
                .filter(|(node, _)| *node == code)
                .collect(),
            None => graph.iter().collect(),
        };

        if let Some(code) = &self.code {
            if entries.is_empty() {
                anyhow::bail!("Module {code} is not part of the prerequisite graph");
            }
        }

        match self.output {
            OutputFormat::Text => {
                println!("{}", "=== Prerequisite Graph ===".heading());
                for (node, dependents) in entries {
                    let codes: Vec<_> = dependents.iter().map(ModuleCode::as_str).collect();
                    let marker = if catalog.contains_key(node) {
                        String::new()
                    } else {
                        " (not in catalog)".dim()
                    };
                    println!("{node}{marker} → [{}]", codes.join(", "));
                }
            }
            OutputFormat::Json => {
                let map: serde_json::Map<String, serde_json::Value> = entries
                    .into_iter()
                    .map(|(node, dependents)| {
                        let dependents = dependents
                            .iter()
                            .map(|code| serde_json::Value::from(code.as_str()))
                            .collect();
                        (node.to_string(), serde_json::Value::Array(dependents))
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            }
        }

        Ok(())
    }
}
