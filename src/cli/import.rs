use std::path::{Path, PathBuf};

use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// JSON file holding a remote module record
    path: PathBuf,

    /// Module type to assign, overriding the configured default
    #[arg(long = "type")]
    kind: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (config, storage) = super::open_storage(root);

        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", self.path.display()))?;
        let kind = self.kind.as_deref().unwrap_or(config.default_type());
        let module = modcat::remote::parse_remote_module(&json, kind)?;

        let mut catalog = storage.load_modules().value;
        let code = module.code().clone();
        let replaced = catalog.insert(code.clone(), module).is_some();

        if !storage.save_modules(&catalog) {
            anyhow::bail!("Failed to save {}", storage.modules_path().display());
        }

        tracing::info!("Imported module: {code}");
        let verb = if replaced { "Updated" } else { "Added" };
        println!("{}", format!("{verb} {code}").success());

        Ok(())
    }
}
