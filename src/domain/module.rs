use std::{fmt, str::FromStr};

use crate::domain::{ModuleCode, PrereqTree};

/// The credit weight of a module.
///
/// Always within [`Credits::MIN`]..=[`Credits::MAX`]; values outside the
/// range are treated as unparseable rather than unusual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Credits(u32);

impl Credits {
    /// The smallest accepted credit value.
    pub const MIN: u32 = 1;
    /// The largest accepted credit value.
    pub const MAX: u32 = 20;

    /// Creates a new `Credits` value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredits` if the value is outside the accepted range.
    pub fn new(value: u32) -> Result<Self, InvalidCredits> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidCredits(value.to_string()))
        }
    }

    /// Returns the credit value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for Credits {
    type Err = InvalidCredits;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse::<u32>().map_err(|_| InvalidCredits(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a credit value is non-numeric or out of range.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid credits '{0}': expected an integer between 1 and 20")]
pub struct InvalidCredits(String);

/// A university course module.
///
/// Modules are immutable once constructed. They are owned by the catalog
/// they were loaded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    code: ModuleCode,
    name: String,
    credits: Credits,
    kind: String,
    prerequisites: PrereqTree,
}

impl Module {
    /// Creates a new module.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or the module type is empty, or if the
    /// prerequisites nest deeper than [`PrereqTree::MAX_DEPTH`].
    pub fn new(
        code: ModuleCode,
        name: String,
        credits: Credits,
        kind: String,
        prerequisites: PrereqTree,
    ) -> Result<Self, ModuleError> {
        if name.is_empty() {
            return Err(ModuleError::EmptyName(code));
        }
        if kind.is_empty() {
            return Err(ModuleError::EmptyType(code));
        }
        if prerequisites.depth() > PrereqTree::MAX_DEPTH {
            return Err(ModuleError::TooDeep(code));
        }

        tracing::trace!("Module created: {name} ({code})");

        Ok(Self {
            code,
            name,
            credits,
            kind,
            prerequisites,
        })
    }

    /// The module code, e.g. `CS2113`.
    #[must_use]
    pub const fn code(&self) -> &ModuleCode {
        &self.code
    }

    /// The display name of the module.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The credit weight of the module.
    #[must_use]
    pub const fn credits(&self) -> Credits {
        self.credits
    }

    /// The module type, e.g. `core` or `elective`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The modules that must be completed before this one.
    #[must_use]
    pub const fn prerequisites(&self) -> &PrereqTree {
        &self.prerequisites
    }
}

/// Errors that can occur when constructing a [`Module`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModuleError {
    /// The module name was empty.
    #[error("module {0} has an empty name")]
    EmptyName(ModuleCode),
    /// The module type was empty.
    #[error("module {0} has an empty type")]
    EmptyType(ModuleCode),
    /// The prerequisite expression was nested too deeply to be stored.
    #[error("prerequisites of module {0} are nested too deeply")]
    TooDeep(ModuleCode),
}
