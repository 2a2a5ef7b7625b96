use std::path::Path;

use tracing::instrument;

use super::CONFIG_FILE;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Module type assigned to imported modules
    #[arg(long, default_value = "core")]
    default_type: String,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            anyhow::bail!("Catalog already initialized (found existing {CONFIG_FILE})");
        }

        std::fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

        let config = modcat::Config::default().with_default_type(self.default_type);
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

        println!("Initialized module catalog in {}", root.display());
        println!("  Created: {CONFIG_FILE}");
        println!("  Modules: {}", config.modules_file().display());
        println!("  Majors:  {}", config.majors_file().display());

        Ok(())
    }
}
