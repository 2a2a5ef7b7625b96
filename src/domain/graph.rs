//! Prerequisite dependency graph.
//!
//! The [`DependencyGraph`] knows nothing about the filesystem. It is a
//! derived, disposable view of a [`Catalog`]: an edge `A → B` means `A` must
//! be taken before `B`. It is rebuilt from scratch whenever the catalog
//! changes.

use std::collections::{BTreeMap, btree_map};

use tracing::instrument;

use crate::domain::{Catalog, ModuleCode};

/// Forward adjacency mapping from a module to the modules that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    dependents: BTreeMap<ModuleCode, Vec<ModuleCode>>,
}

impl DependencyGraph {
    /// Derives the graph from a catalog.
    ///
    /// Every catalog module becomes a node, even if nothing depends on it.
    /// Codes referenced by a prerequisite expression but missing from the
    /// catalog are added as nodes on demand.
    ///
    /// Dependent lists follow catalog iteration order. There is one edge per
    /// occurrence of a code in a prerequisite expression, so edges are not
    /// deduplicated: a prerequisite appearing in two ALL-of groups of the
    /// same module yields two entries. Cycles are not detected.
    #[must_use]
    #[instrument(level = "debug", skip_all, fields(modules = catalog.len()))]
    pub fn build(catalog: &Catalog) -> Self {
        let mut dependents: BTreeMap<ModuleCode, Vec<ModuleCode>> = catalog
            .keys()
            .map(|code| (code.clone(), Vec::new()))
            .collect();

        for module in catalog.values() {
            for prereq in module.prerequisites().codes() {
                dependents
                    .entry(prereq.clone())
                    .or_default()
                    .push(module.code().clone());
            }
        }

        tracing::debug!("Built dependency graph with {} nodes", dependents.len());

        Self { dependents }
    }

    /// The modules that list `code` as a prerequisite.
    ///
    /// Returns `None` if `code` is not a node of the graph.
    #[must_use]
    pub fn dependents(&self, code: &ModuleCode) -> Option<&[ModuleCode]> {
        self.dependents.get(code).map(Vec::as_slice)
    }

    /// Whether `code` is a node of the graph.
    #[must_use]
    pub fn contains(&self, code: &ModuleCode) -> bool {
        self.dependents.contains_key(code)
    }

    /// Iterates over all nodes of the graph.
    pub fn codes(&self) -> impl Iterator<Item = &ModuleCode> {
        self.dependents.keys()
    }

    /// Iterates over every node and its dependents.
    pub fn iter(&self) -> btree_map::Iter<'_, ModuleCode, Vec<ModuleCode>> {
        self.dependents.iter()
    }

    /// The number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Consumes the graph, returning the raw adjacency mapping.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<ModuleCode, Vec<ModuleCode>> {
        self.dependents
    }
}

impl<'a> IntoIterator for &'a DependencyGraph {
    type Item = (&'a ModuleCode, &'a Vec<ModuleCode>);
    type IntoIter = btree_map::Iter<'a, ModuleCode, Vec<ModuleCode>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Derives the dependency graph of a catalog.
///
/// Shorthand for [`DependencyGraph::build`].
#[must_use]
pub fn build_dependency_graph(catalog: &Catalog) -> DependencyGraph {
    DependencyGraph::build(catalog)
}
