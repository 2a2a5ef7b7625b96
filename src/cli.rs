use std::path::{Path, PathBuf};

mod check;
mod graph;
mod import;
mod init;
mod majors;
mod show;
mod terminal;

use clap::ArgAction;
use modcat::{Config, ModuleCode, Storage};

/// Name of the configuration file in the catalog root.
const CONFIG_FILE: &str = "modcat.toml";

/// Parse a module code from a string.
///
/// Normalization to uppercase happens in `ModuleCode` itself.
fn parse_code(s: &str) -> Result<ModuleCode, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the catalog
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or(Command::Check(check::Command::default()))
            .run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Load the catalog and report skipped records (default)
    Check(check::Command),

    /// Write a default configuration file
    Init(init::Command),

    /// Show a single module
    Show(show::Command),

    /// Show the prerequisite dependency graph
    ///
    /// Each module is listed with the modules that require it.
    Graph(graph::Command),

    /// List majors and their modules
    Majors(majors::Command),

    /// Add a module from a remote catalog record (JSON)
    Import(import::Command),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Check(command) => command.run(root)?,
            Self::Init(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Graph(command) => command.run(root)?,
            Self::Majors(command) => command.run(root)?,
            Self::Import(command) => command.run(root)?,
        }
        Ok(())
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn open_storage(root: &Path) -> (Config, Storage) {
    let config = load_config(root);
    let storage = Storage::from_config(root, &config);
    (config, storage)
}
