//! A file backed store of catalog records.
//!
//! Loading never fails outright: records that cannot be decoded are skipped
//! and reported as [`Warning`]s alongside the best-effort result. Saving
//! writes to a temporary file next to the target and renames it into place,
//! so a concurrent reader sees either the old or the new content.

use std::{
    collections::BTreeMap,
    fmt,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    str::{self, Utf8Error},
};

use tempfile::NamedTempFile;
use tracing::instrument;

use crate::{
    domain::{Catalog, Major},
    storage::record::{decode_major, decode_module, encode_major, encode_module},
};

/// A diagnostic produced while loading a catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The 1-based line the warning refers to, if any.
    pub line: Option<usize>,
    /// A description of the problem.
    pub message: String,
}

impl Warning {
    fn at_line(line: usize, message: impl fmt::Display) -> Self {
        Self {
            line: Some(line),
            message: message.to_string(),
        }
    }

    fn for_file(message: impl fmt::Display) -> Self {
        Self {
            line: None,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A best-effort load result together with the problems encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    /// Everything that could be loaded.
    pub value: T,
    /// One entry per skipped record or file-level failure.
    pub warnings: Vec<Warning>,
}

impl<T: Default> Loaded<T> {
    fn failed(warning: Warning) -> Self {
        Self {
            value: T::default(),
            warnings: vec![warning],
        }
    }
}

impl<T> Loaded<T> {
    /// Returns `true` if nothing was skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Majors keyed by name.
pub type Majors = BTreeMap<String, Major>;

/// Errors that can occur when saving a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The parent directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The records could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Loads all module records from a file.
///
/// A missing file (and its parent directory) is created empty. Records with
/// the wrong number of fields, invalid credits, invalid codes or undecodable
/// prerequisites are skipped with a warning. If two records share a code the
/// later one wins, with a warning.
#[instrument(level = "debug")]
pub fn load_modules(path: &Path) -> Loaded<Catalog> {
    let lines = match read_lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!("Failed to load {}: {e}", path.display());
            return Loaded::failed(Warning::for_file(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let mut catalog = Catalog::new();
    let mut warnings = Vec::new();

    for (number, line) in records(&lines) {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warnings.push(undecodable(path, number, e));
                continue;
            }
        };
        match decode_module(line) {
            Ok(module) => {
                let code = module.code().clone();
                if catalog.insert(code.clone(), module).is_some() {
                    tracing::warn!("Line {number}: duplicate module {code} replaces earlier record");
                    warnings.push(Warning::at_line(
                        number,
                        format!("duplicate module {code} replaces earlier record"),
                    ));
                }
            }
            Err(e) => {
                tracing::warn!("Skipping line {number} of {}: {e}", path.display());
                warnings.push(Warning::at_line(number, e));
            }
        }
    }

    tracing::debug!(
        "Loaded {} modules with {} warnings",
        catalog.len(),
        warnings.len()
    );

    Loaded {
        value: catalog,
        warnings,
    }
}

/// Loads all major records from a file, resolving them against `catalog`.
///
/// References to codes absent from the catalog are dropped silently.
#[instrument(level = "debug", skip(catalog))]
pub fn load_majors(path: &Path, catalog: &Catalog) -> Loaded<Majors> {
    let lines = match read_lines(path) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!("Failed to load {}: {e}", path.display());
            return Loaded::failed(Warning::for_file(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let mut majors = Majors::new();
    let mut warnings = Vec::new();

    for (number, line) in records(&lines) {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warnings.push(undecodable(path, number, e));
                continue;
            }
        };
        let record = match decode_major(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping line {number} of {}: {e}", path.display());
                warnings.push(Warning::at_line(number, e));
                continue;
            }
        };

        let modules = record
            .codes
            .iter()
            .filter_map(|code| {
                let module = catalog.get(code);
                if module.is_none() {
                    tracing::debug!("Major {} references unknown module {code}", record.name);
                }
                module.cloned()
            })
            .collect();

        let major = Major::new(record.name.clone(), record.abbreviation, modules);
        if majors.insert(record.name.clone(), major).is_some() {
            tracing::warn!(
                "Line {number}: duplicate major {} replaces earlier record",
                record.name
            );
            warnings.push(Warning::at_line(
                number,
                format!("duplicate major {} replaces earlier record", record.name),
            ));
        }
    }

    Loaded {
        value: majors,
        warnings,
    }
}

/// Writes every module in the catalog to `path`, replacing its content.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
#[instrument(level = "debug", skip(catalog), fields(modules = catalog.len()))]
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<(), SaveError> {
    write_records(path, catalog.values().map(encode_module))
}

/// Writes every major to `path`, replacing its content.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
#[instrument(level = "debug", skip(majors), fields(majors = majors.len()))]
pub fn save_majors(path: &Path, majors: &Majors) -> Result<(), SaveError> {
    write_records(path, majors.values().map(encode_major))
}

/// A line of a catalog file, or the reason it is not text.
type Line = Result<String, Utf8Error>;

/// Non-blank lines paired with their 1-based line numbers.
fn records(lines: &[Line]) -> impl Iterator<Item = (usize, Result<&str, &Utf8Error>)> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| (i + 1, line.as_deref()))
        .filter(|(_, line)| !matches!(line, Ok(text) if text.trim().is_empty()))
}

fn undecodable(path: &Path, number: usize, error: &Utf8Error) -> Warning {
    tracing::warn!("Skipping line {number} of {}: {error}", path.display());
    Warning::at_line(number, format!("line is not valid UTF-8: {error}"))
}

/// Reads a catalog file line by line.
///
/// Lines are decoded independently, so one line of invalid UTF-8 does not
/// hide the rest of the file.
fn read_lines(path: &Path) -> io::Result<Vec<Line>> {
    ensure_parent_dir(path)?;
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Creating empty catalog file {}", path.display());
            File::create(path)?;
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let lines: Vec<Line> = bytes
        .split(|&byte| byte == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .map(|line| str::from_utf8(line).map(String::from))
        .collect();
    tracing::trace!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn write_records(path: &Path, records: impl Iterator<Item = String>) -> Result<(), SaveError> {
    ensure_parent_dir(path).map_err(|source| SaveError::CreateDir {
        path: path.parent().unwrap_or(path).to_path_buf(),
        source,
    })?;

    let write_error = |source| SaveError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;

    let mut count = 0usize;
    for record in records {
        writeln!(file, "{record}").map_err(write_error)?;
        count += 1;
    }
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;

    tracing::debug!("Saved {count} records to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        domain::{Combinator, Credits, Module, ModuleCode, PrereqTree},
        storage::frame::Serialiser,
    };

    fn module(code: &str, prereqs: &[&str]) -> Module {
        Module::new(
            code.parse().unwrap(),
            format!("Module {code}"),
            Credits::new(4).unwrap(),
            "core".to_string(),
            PrereqTree::from_legacy(prereqs.iter().map(|c| c.parse().unwrap()).collect()),
        )
        .unwrap()
    }

    fn catalog(modules: Vec<Module>) -> Catalog {
        modules.into_iter().map(|m| (m.code().clone(), m)).collect()
    }

    #[test]
    fn missing_file_is_created_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/modules.txt");

        let loaded = load_modules(&path);

        assert!(loaded.value.is_empty());
        assert!(loaded.is_clean());
        assert!(path.exists());
    }

    #[test]
    fn unreadable_file_gives_empty_catalog_and_warning() {
        let tmp = TempDir::new().unwrap();

        // a directory cannot be read as a file
        let loaded = load_modules(tmp.path());

        assert!(loaded.value.is_empty());
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line, None);
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modules.txt");
        let original = catalog(vec![
            module("CS1010", &[]),
            module("CS2030", &["CS1010"]),
            module("CS2040", &["CS1010"]),
        ]);

        save_catalog(&path, &original).unwrap();
        let loaded = load_modules(&path);

        assert!(loaded.is_clean());
        assert_eq!(loaded.value, original);
    }

    #[test]
    fn save_replaces_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modules.txt");

        save_catalog(&path, &catalog(vec![module("A1", &[]), module("B1", &[])])).unwrap();
        save_catalog(&path, &catalog(vec![module("C1", &[])])).unwrap();

        let loaded = load_modules(&path);
        assert_eq!(loaded.value.len(), 1);
        assert!(loaded.value.contains_key(&"C1".parse::<ModuleCode>().unwrap()));
    }

    #[test]
    fn blank_lines_are_ignored_and_bad_lines_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modules.txt");
        let good = encode_module(&module("CS1010", &[]));
        fs::write(&path, format!("\n{good}\ngarbage\n\n")).unwrap();

        let loaded = load_modules(&path);

        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line, Some(3));
        assert!(loaded.warnings[0].to_string().starts_with("line 3: "));
    }

    #[test]
    fn duplicate_codes_keep_last_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modules.txt");
        let first = encode_module(&module("CS1010", &[]));
        let second = encode_module(&module("CS1010", &["MA1521"]));
        fs::write(&path, format!("{first}\n{second}\n")).unwrap();

        let loaded = load_modules(&path);

        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.warnings.len(), 1);
        let code: ModuleCode = "CS1010".parse().unwrap();
        assert!(!loaded.value[&code].prerequisites().is_empty());
    }

    #[test]
    fn majors_resolve_against_catalog() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("majors.txt");
        let modules = catalog(vec![module("CS1010", &[]), module("CS2030", &["CS1010"])]);

        let mut serialiser = Serialiser::new();
        serialiser
            .field("Computer Science")
            .field("CS")
            .field("CS2030,CS9999,CS1010");
        fs::write(&path, format!("{}\n", serialiser.finish())).unwrap();

        let loaded = load_majors(&path, &modules);

        assert!(loaded.is_clean());
        let major = &loaded.value["Computer Science"];
        let codes: Vec<_> = major.modules().iter().map(|m| m.code().as_str()).collect();
        assert_eq!(codes, ["CS2030", "CS1010"]);
        assert_eq!(major.total_credits(), 8);
    }

    #[test]
    fn majors_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("majors.txt");
        let modules = catalog(vec![module("CS1010", &[])]);
        let major = Major::new(
            "Computer Science".to_string(),
            "CS".to_string(),
            modules.values().cloned().collect(),
        );
        let majors = Majors::from([(major.name().to_string(), major)]);

        save_majors(&path, &majors).unwrap();
        let loaded = load_majors(&path, &modules);

        assert!(loaded.is_clean());
        assert_eq!(loaded.value, majors);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_alone() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modules.txt");
        let mut bytes = Vec::new();
        for code in ["CS1010", "CS2030"] {
            bytes.extend_from_slice(encode_module(&module(code, &[])).as_bytes());
            bytes.push(b'\n');
        }
        bytes.extend_from_slice(b"\xff\xfe bad\r\n");
        bytes.extend_from_slice(encode_module(&module("CS2040", &[])).as_bytes());
        bytes.extend_from_slice(b"\r\n");
        fs::write(&path, bytes).unwrap();

        let loaded = load_modules(&path);

        assert_eq!(loaded.value.len(), 3);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line, Some(3));
    }

    #[test]
    fn duplicate_majors_keep_last_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("majors.txt");
        let modules = catalog(vec![module("CS1010", &[]), module("CS2030", &[])]);

        let lines: Vec<_> = ["CS1010", "CS2030"]
            .into_iter()
            .map(|codes| {
                let mut serialiser = Serialiser::new();
                serialiser.field("Computer Science").field("CS").field(codes);
                serialiser.finish()
            })
            .collect();
        fs::write(&path, format!("{}\n{}\n", lines[0], lines[1])).unwrap();

        let loaded = load_majors(&path, &modules);

        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line, Some(2));
        let major = &loaded.value["Computer Science"];
        assert_eq!(major.modules()[0].code().as_str(), "CS2030");
    }

    #[test]
    fn deepest_storable_prerequisites_load_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modules.txt");
        let prerequisites = (0..PrereqTree::MAX_DEPTH)
            .fold(PrereqTree::Leaf("CS1010".parse().unwrap()), |tree, _| {
                PrereqTree::Group(Combinator::AllOf, vec![tree])
            });
        let deep = Module::new(
            "CS5330".parse().unwrap(),
            "Randomized Algorithms".to_string(),
            Credits::new(4).unwrap(),
            "elective".to_string(),
            prerequisites,
        )
        .unwrap();
        let original = catalog(vec![deep]);

        save_catalog(&path, &original).unwrap();
        let loaded = load_modules(&path);

        assert!(loaded.is_clean());
        assert_eq!(loaded.value, original);
    }
}
