//! Plain-text University Module Catalog
//!
//! Modules and the prerequisite logic governing when each may be taken are
//! stored as line-oriented text records. The catalog can be loaded, saved and
//! turned into a prerequisite dependency graph.

pub mod domain;
pub use domain::{
    Catalog, Combinator, Config, Credits, DependencyGraph, Major, Module, ModuleCode, PrereqTree,
    build_dependency_graph,
};

/// Translation of remote catalog records.
pub mod remote;

/// File storage for module and major records.
pub mod storage;
pub use storage::{Loaded, Storage, Warning, load_majors, load_modules, save_catalog};
