use std::path::Path;

use tracing::instrument;

use super::terminal::{Colorize, print_warnings};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Only show the major with this name or abbreviation
    name: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, storage) = super::open_storage(root);
        let catalog = storage.load_modules().value;
        let loaded = storage.load_majors(&catalog);
        print_warnings(&storage.majors_path().display().to_string(), &loaded.warnings);

        let majors: Vec<_> = loaded
            .value
            .values()
            .filter(|major| {
                self.name.as_deref().is_none_or(|name| {
                    major.name().eq_ignore_ascii_case(name)
                        || major.abbreviation().eq_ignore_ascii_case(name)
                })
            })
            .collect();

        if majors.is_empty() {
            println!("{}", "No majors found.".dim());
            return Ok(());
        }

        for major in majors {
            println!(
                "{} ({}): {} credits",
                major.name().heading(),
                major.abbreviation(),
                major.total_credits()
            );
            for module in major.modules() {
                println!("  {} {} [{}]", module.code(), module.name(), module.kind());
            }
        }

        Ok(())
    }
}
