//! Domain models for the module catalog.
//!
//! This module contains the core domain types including module codes,
//! prerequisite expressions, modules, majors, configuration and the derived
//! dependency graph.

use std::collections::BTreeMap;

/// Module code validation.
pub mod code;
pub use code::{InvalidCodeError, ModuleCode};

/// Prerequisite expressions.
pub mod prereq;
pub use prereq::{Combinator, PrereqTree};

mod module;
pub use module::{Credits, InvalidCredits, Module, ModuleError};

mod major;
pub use major::Major;

/// Prerequisite dependency graph.
pub mod graph;
pub use graph::{DependencyGraph, build_dependency_graph};

mod config;
pub use config::Config;

/// The full set of known modules, keyed by code.
pub type Catalog = BTreeMap<ModuleCode, Module>;
