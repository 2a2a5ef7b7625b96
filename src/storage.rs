//! Persistence for the module catalog.
//!
//! Records are stored one per line as a sequence of self-delimiting frames
//! (see [`frame`]). [`record`] maps modules and majors to and from lines, and
//! [`catalog`] reads and writes whole files. [`Storage`] ties a pair of
//! files together for callers that work with a catalog root.

use std::path::{Path, PathBuf};

pub mod catalog;
pub mod frame;
pub mod record;

pub use catalog::{
    Loaded, Majors, SaveError, Warning, load_majors, load_modules, save_catalog, save_majors,
};
pub use frame::{Deserialiser, FrameError, Serialiser};
pub use record::{PrereqError, RecordError};

use crate::domain::{Catalog, Config};

/// The module and major files of one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    modules_path: PathBuf,
    majors_path: PathBuf,
}

impl Storage {
    /// Creates a storage tied to the given files.
    ///
    /// # Errors
    ///
    /// Returns an error if either path is empty.
    pub fn new(modules_path: PathBuf, majors_path: PathBuf) -> Result<Self, StorageError> {
        if modules_path.as_os_str().is_empty() || majors_path.as_os_str().is_empty() {
            return Err(StorageError::EmptyPath);
        }
        Ok(Self {
            modules_path,
            majors_path,
        })
    }

    /// Creates a storage for the files named by `config`, relative to `root`.
    #[must_use]
    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self {
            modules_path: root.join(config.modules_file()),
            majors_path: root.join(config.majors_file()),
        }
    }

    /// The module records file.
    #[must_use]
    pub fn modules_path(&self) -> &Path {
        &self.modules_path
    }

    /// The major records file.
    #[must_use]
    pub fn majors_path(&self) -> &Path {
        &self.majors_path
    }

    /// Loads the module catalog.
    #[must_use]
    pub fn load_modules(&self) -> Loaded<Catalog> {
        load_modules(&self.modules_path)
    }

    /// Loads the majors, resolving their modules against `catalog`.
    #[must_use]
    pub fn load_majors(&self, catalog: &Catalog) -> Loaded<Majors> {
        load_majors(&self.majors_path, catalog)
    }

    /// Saves the module catalog.
    ///
    /// Failures are logged and reported as `false` rather than raised.
    pub fn save_modules(&self, catalog: &Catalog) -> bool {
        log_failure(save_catalog(&self.modules_path, catalog))
    }

    /// Saves the majors.
    ///
    /// Failures are logged and reported as `false` rather than raised.
    pub fn save_majors(&self, majors: &Majors) -> bool {
        log_failure(save_majors(&self.majors_path, majors))
    }
}

fn log_failure(result: Result<(), SaveError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to save catalog: {e}");
            false
        }
    }
}

/// Errors that can occur when constructing a [`Storage`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    /// A file path was empty.
    #[error("file path must not be empty")]
    EmptyPath,
}
