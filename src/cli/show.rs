use std::path::Path;

use modcat::{DependencyGraph, ModuleCode};
use tracing::instrument;

use super::terminal::Colorize;

const MAX_LISTED_COMBINATIONS: usize = 64;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The module code, e.g. CS2113
    #[arg(value_parser = super::parse_code)]
    code: ModuleCode,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, storage) = super::open_storage(root);
        let catalog = storage.load_modules().value;

        let module = catalog
            .get(&self.code)
            .ok_or_else(|| anyhow::anyhow!("Module {} not found", self.code))?;

        println!("{}", format!("{} {}", module.code(), module.name()).heading());
        println!("Credits:       {}", module.credits());
        println!("Type:          {}", module.kind());
        println!("Prerequisites: {}", module.prerequisites());

        let listable = module
            .prerequisites()
            .combination_count()
            .is_some_and(|count| count <= MAX_LISTED_COMBINATIONS);
        let groups = if listable {
            module.prerequisites().flatten_groups()
        } else {
            println!("{}", "Too many combinations to list.".dim());
            Vec::new()
        };
        if groups.len() > 1 {
            println!("{}", "Satisfied by any of:".dim());
            for group in groups {
                let codes: Vec<_> = group.iter().map(ModuleCode::as_str).collect();
                println!("  - {}", codes.join(", "));
            }
        }

        let graph = DependencyGraph::build(&catalog);
        let dependents = graph.dependents(module.code()).unwrap_or_default();
        if dependents.is_empty() {
            println!("Required by:   {}", "nothing".dim());
        } else {
            let codes: Vec<_> = dependents.iter().map(ModuleCode::as_str).collect();
            println!("Required by:   {}", codes.join(", "));
        }

        Ok(())
    }
}
