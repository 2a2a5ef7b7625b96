//! Translation of remote catalog records into [`Module`]s.
//!
//! The remote catalog returns one JSON object per module. Only the fields
//! needed for a [`Module`] are read; anything else in the response is
//! ignored. Fetching the record is left to the caller.
//!
//! ```
//! use modcat::remote::parse_remote_module;
//!
//! let json = r#"{
//!     "moduleCode": "CS2030",
//!     "title": "Programming Methodology II",
//!     "moduleCredit": "4",
//!     "prereqTree": { "or": ["CS1010:D", "CS1101S"] }
//! }"#;
//!
//! let module = parse_remote_module(json, "core").unwrap();
//! assert_eq!(module.prerequisites().to_string(), "CS1010 or CS1101S");
//! ```

use serde::Deserialize;

use crate::domain::{
    Combinator, Credits, InvalidCodeError, InvalidCredits, Module, ModuleCode, ModuleError,
    PrereqTree,
};

/// A module record as returned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteModule {
    /// The module code.
    pub module_code: String,
    /// The module's display name.
    pub title: String,
    /// The credit weight, sent either as a number or as numeric text.
    pub module_credit: RemoteCredits,
    /// The prerequisite expression, absent when there are none.
    #[serde(default)]
    pub prereq_tree: Option<RemotePrereq>,
}

/// A credit value in either of the encodings the remote catalog uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RemoteCredits {
    /// A JSON number.
    Number(u32),
    /// A JSON string holding a number.
    Text(String),
}

/// A node of a remote prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RemotePrereq {
    /// A single module, possibly with a grade suffix (`CS1010:D`) or a
    /// wildcard marker (`CS2040%`).
    Code(String),
    /// A combination of sub-expressions.
    Group(RemoteGroup),
}

/// A combination node of a remote prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteGroup {
    /// Every child must be satisfied.
    And(Vec<RemotePrereq>),
    /// At least one child must be satisfied.
    Or(Vec<RemotePrereq>),
}

/// Errors that can occur when translating a remote record.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The response was not a valid module record.
    #[error("invalid remote record: {0}")]
    Json(#[from] serde_json::Error),
    /// A module code was invalid.
    #[error(transparent)]
    Code(#[from] InvalidCodeError),
    /// The credit value was invalid.
    #[error(transparent)]
    Credits(#[from] InvalidCredits),
    /// The record did not form a valid module.
    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl RemoteModule {
    /// Converts the record into a [`Module`] of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the code, credits or any prerequisite code is
    /// invalid, or if the title is empty.
    pub fn into_module(self, kind: &str) -> Result<Module, RemoteError> {
        let code = ModuleCode::new(self.module_code)?;
        let credits = match self.module_credit {
            RemoteCredits::Number(value) => Credits::new(value)?,
            RemoteCredits::Text(text) => text.trim().parse()?,
        };
        let prerequisites = self
            .prereq_tree
            .map(RemotePrereq::into_tree)
            .transpose()?
            .unwrap_or_default();

        Ok(Module::new(
            code,
            self.title,
            credits,
            kind.to_string(),
            prerequisites,
        )?)
    }
}

impl RemotePrereq {
    /// Converts the remote expression into a [`PrereqTree`] of the same shape.
    ///
    /// # Errors
    ///
    /// Returns an error if any leaf is not a valid module code once its grade
    /// suffix and wildcard marker are removed.
    pub fn into_tree(self) -> Result<PrereqTree, InvalidCodeError> {
        match self {
            Self::Code(raw) => leaf_code(&raw).map(PrereqTree::Leaf),
            Self::Group(RemoteGroup::And(children)) => group(Combinator::AllOf, children),
            Self::Group(RemoteGroup::Or(children)) => group(Combinator::AnyOf, children),
        }
    }
}

fn group(combinator: Combinator, children: Vec<RemotePrereq>) -> Result<PrereqTree, InvalidCodeError> {
    let children = children
        .into_iter()
        .map(RemotePrereq::into_tree)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PrereqTree::Group(combinator, children))
}

fn leaf_code(raw: &str) -> Result<ModuleCode, InvalidCodeError> {
    let without_grade = raw.split_once(':').map_or(raw, |(code, _grade)| code);
    ModuleCode::new(without_grade.trim().trim_end_matches('%').to_string())
}

/// Parses a remote JSON record and converts it into a [`Module`].
///
/// # Errors
///
/// Returns an error if the JSON is not a module record or the record fails
/// validation.
pub fn parse_remote_module(json: &str, kind: &str) -> Result<Module, RemoteError> {
    let record: RemoteModule = serde_json::from_str(json)?;
    tracing::debug!("Translating remote record for {}", record.module_code);
    record.into_module(kind)
}
