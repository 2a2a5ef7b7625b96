use crate::domain::Module;

/// A named program of study referencing a subset of catalog modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Major {
    name: String,
    abbreviation: String,
    modules: Vec<Module>,
}

impl Major {
    /// Creates a new major from already-resolved modules.
    #[must_use]
    pub const fn new(name: String, abbreviation: String, modules: Vec<Module>) -> Self {
        Self {
            name,
            abbreviation,
            modules,
        }
    }

    /// The full name of the major, e.g. `Computer Science`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The short form of the major, e.g. `CS`.
    #[must_use]
    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    /// The modules that make up the major, in file order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Total credits across all modules of the major.
    #[must_use]
    pub fn total_credits(&self) -> u32 {
        self.modules.iter().map(|m| m.credits().get()).sum()
    }
}
