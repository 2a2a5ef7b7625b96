use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a module catalog.
///
/// Controls where catalog data is stored and how imported modules are
/// categorised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Path of the module records file, relative to the catalog root.
    modules_file: PathBuf,

    /// Path of the major records file, relative to the catalog root.
    majors_file: PathBuf,

    /// The module type assigned to modules imported from remote records.
    ///
    /// For example, 'core' or 'elective'.
    default_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modules_file: default_modules_file(),
            majors_file: default_majors_file(),
            default_type: default_type(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The module records file, relative to the catalog root.
    #[must_use]
    pub fn modules_file(&self) -> &Path {
        &self.modules_file
    }

    /// The major records file, relative to the catalog root.
    #[must_use]
    pub fn majors_file(&self) -> &Path {
        &self.majors_file
    }

    /// The module type given to imported modules.
    #[must_use]
    pub fn default_type(&self) -> &str {
        &self.default_type
    }

    /// Sets the module type given to imported modules.
    #[must_use]
    pub fn with_default_type(mut self, default_type: String) -> Self {
        self.default_type = default_type;
        self
    }
}

fn default_modules_file() -> PathBuf {
    PathBuf::from("data/modules.txt")
}

fn default_majors_file() -> PathBuf {
    PathBuf::from("data/majors.txt")
}

fn default_type() -> String {
    "core".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_modules_file")]
        modules_file: PathBuf,

        #[serde(default = "default_majors_file")]
        majors_file: PathBuf,

        /// Type assigned to imported modules.
        #[serde(default = "default_type")]
        default_type: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                modules_file,
                majors_file,
                default_type,
            } => Self {
                modules_file,
                majors_file,
                default_type,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            modules_file: config.modules_file,
            majors_file: config.majors_file,
            default_type: config.default_type,
        }
    }
}
