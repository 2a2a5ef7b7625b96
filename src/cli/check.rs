use std::path::Path;

use modcat::DependencyGraph;
use tracing::instrument;

use super::terminal::{Colorize, print_warnings};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Exit with an error if any record was skipped
    #[arg(long)]
    strict: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, storage) = super::open_storage(root);

        let modules = storage.load_modules();
        let majors = storage.load_majors(&modules.value);

        let skipped = print_warnings(
            &storage.modules_path().display().to_string(),
            &modules.warnings,
        ) + print_warnings(
            &storage.majors_path().display().to_string(),
            &majors.warnings,
        );

        let graph = DependencyGraph::build(&modules.value);
        let external = graph
            .codes()
            .filter(|code| !modules.value.contains_key(*code))
            .count();

        println!(
            "{} modules, {} majors, {} prerequisite nodes ({external} outside the catalog)",
            modules.value.len(),
            majors.value.len(),
            graph.len(),
        );

        if skipped == 0 {
            println!("{}", "✅ All records loaded.".success());
        } else {
            println!("{}", format!("{skipped} records skipped.").warning());
            if self.strict {
                anyhow::bail!("{skipped} records could not be loaded");
            }
        }

        Ok(())
    }
}
