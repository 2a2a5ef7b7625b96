//! Line codec for catalog records.
//!
//! A module record is five frames: code, name, credits, type and the encoded
//! prerequisite expression. A major record is at least three frames: name,
//! abbreviation and one or more comma-joined lists of module codes.
//!
//! The prerequisite expression has its own nested encoding, embedded as the
//! fifth frame:
//!
//! - `L<frame(code)>` for a leaf
//! - `&<frame(children)>` for an ALL-of group
//! - `|<frame(children)>` for an ANY-of group
//!
//! where `children` is the concatenation of the children's encodings. Older
//! catalog files store a flat list of framed codes instead; such a field is
//! either empty or starts with a digit, and is migrated to a single mandatory
//! combination on read.

use crate::{
    domain::{
        Combinator, Credits, InvalidCodeError, InvalidCredits, Major, Module, ModuleCode,
        ModuleError, PrereqTree,
    },
    storage::frame::{decode_fields, encode_field, Deserialiser, FrameError, Serialiser},
};

const MODULE_FIELDS: usize = 5;
const MAJOR_MIN_FIELDS: usize = 3;

const LEAF_TAG: char = 'L';
const ALL_OF_TAG: char = '&';
const ANY_OF_TAG: char = '|';

/// Errors that make a record unusable.
///
/// Every variant is a malformed record: the loader skips the record and
/// reports a warning.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    /// The line could not be split into frames.
    #[error("malformed record: {0}")]
    Frame(#[from] FrameError),
    /// The record had the wrong number of fields.
    #[error("malformed record: expected {expected} fields, found {found}")]
    Arity {
        /// Number of fields required.
        expected: usize,
        /// Number of fields present.
        found: usize,
    },
    /// A required field was empty.
    #[error("malformed record: empty {0}")]
    EmptyField(&'static str),
    /// The credits field was non-numeric or out of range.
    #[error(transparent)]
    Credits(#[from] InvalidCredits),
    /// The module code was invalid.
    #[error(transparent)]
    Code(#[from] InvalidCodeError),
    /// The prerequisite field could not be decoded.
    #[error("malformed prerequisites: {0}")]
    Prereq(#[from] PrereqError),
    /// The decoded fields did not form a valid module.
    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// Errors that can occur when decoding a prerequisite expression.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PrereqError {
    /// A nested frame was malformed.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// A node tag was not recognised.
    #[error("unknown node tag '{0}'")]
    UnknownTag(char),
    /// A node tag was not followed by its frame.
    #[error("node '{0}' has no payload")]
    MissingPayload(char),
    /// A leaf held an invalid module code.
    #[error(transparent)]
    Code(#[from] InvalidCodeError),
    /// The expression did not have exactly one root node.
    #[error("expected a single root node, found {0}")]
    Roots(usize),
    /// The expression was nested deeper than supported.
    #[error("expression is nested too deeply")]
    TooDeep,
}

/// Encodes a module as a single record line, without the line terminator.
#[must_use]
pub fn encode_module(module: &Module) -> String {
    tracing::trace!("Serialising module: {}", module.code());

    let mut serialiser = Serialiser::new();
    serialiser
        .field(module.code())
        .field(module.name())
        .field(&module.credits().to_string())
        .field(module.kind())
        .field(&encode_prereq(module.prerequisites()));
    serialiser.finish()
}

/// Decodes a module record line.
///
/// # Errors
///
/// Returns an error if the line is not exactly five well-formed frames, or
/// if any field fails validation.
pub fn decode_module(line: &str) -> Result<Module, RecordError> {
    let fields = decode_fields(line)?;
    let [code, name, credits, kind, prereqs]: [String; MODULE_FIELDS] =
        fields.try_into().map_err(|fields: Vec<String>| RecordError::Arity {
            expected: MODULE_FIELDS,
            found: fields.len(),
        })?;

    let code = ModuleCode::new(code)?;
    let credits: Credits = credits.parse()?;
    let prerequisites = decode_prereq(&prereqs)?;

    Ok(Module::new(code, name, credits, kind, prerequisites)?)
}

/// A major record whose module references have not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MajorRecord {
    /// The full name of the major.
    pub name: String,
    /// The short form of the major.
    pub abbreviation: String,
    /// Referenced module codes, in file order.
    pub codes: Vec<ModuleCode>,
}

/// Encodes a major as a single record line, without the line terminator.
#[must_use]
pub fn encode_major(major: &Major) -> String {
    let codes = major
        .modules()
        .iter()
        .map(|module| module.code().as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut serialiser = Serialiser::new();
    serialiser
        .field(major.name())
        .field(major.abbreviation())
        .field(&codes);
    serialiser.finish()
}

/// Decodes a major record line.
///
/// Fields after the third hold further comma-joined code lists and are
/// appended in order. Entries that are not valid module codes cannot match
/// any catalog module and are dropped.
///
/// # Errors
///
/// Returns an error if the line has fewer than three well-formed frames or
/// the major's name is empty.
pub fn decode_major(line: &str) -> Result<MajorRecord, RecordError> {
    let fields = decode_fields(line)?;
    if fields.len() < MAJOR_MIN_FIELDS {
        return Err(RecordError::Arity {
            expected: MAJOR_MIN_FIELDS,
            found: fields.len(),
        });
    }

    let mut fields = fields.into_iter();
    let name = fields.next().unwrap_or_default();
    let abbreviation = fields.next().unwrap_or_default();
    if name.is_empty() {
        return Err(RecordError::EmptyField("major name"));
    }

    let codes = fields
        .flat_map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter_map(|entry| match ModuleCode::new(entry) {
            Ok(code) => Some(code),
            Err(e) => {
                tracing::debug!("Dropping major reference: {e}");
                None
            }
        })
        .collect();

    Ok(MajorRecord {
        name,
        abbreviation,
        codes,
    })
}

/// Encodes a prerequisite expression, preserving its exact shape.
#[must_use]
pub fn encode_prereq(tree: &PrereqTree) -> String {
    match tree {
        PrereqTree::Leaf(code) => format!("{LEAF_TAG}{}", encode_field(code)),
        PrereqTree::Group(combinator, children) => {
            let tag = match combinator {
                Combinator::AllOf => ALL_OF_TAG,
                Combinator::AnyOf => ANY_OF_TAG,
            };
            let children: String = children.iter().map(encode_prereq).collect();
            format!("{tag}{}", encode_field(&children))
        }
    }
}

/// Decodes a prerequisite field in either the nested or the legacy format.
///
/// # Errors
///
/// Returns an error if the field is not a valid encoding in either format.
pub fn decode_prereq(field: &str) -> Result<PrereqTree, PrereqError> {
    if field.is_empty() || field.starts_with(|c: char| c.is_ascii_digit()) {
        return decode_legacy(field);
    }

    let mut roots = decode_nodes(field, 0)?;
    match roots.len() {
        1 => Ok(roots.remove(0)),
        n => Err(PrereqError::Roots(n)),
    }
}

fn decode_legacy(field: &str) -> Result<PrereqTree, PrereqError> {
    tracing::debug!("Migrating legacy prerequisite list");
    let codes = decode_fields(field)?
        .into_iter()
        .map(ModuleCode::new)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PrereqTree::from_legacy(codes))
}

fn decode_nodes(mut input: &str, depth: usize) -> Result<Vec<PrereqTree>, PrereqError> {
    if depth > PrereqTree::MAX_DEPTH {
        return Err(PrereqError::TooDeep);
    }

    let mut nodes = Vec::new();
    while let Some(tag) = input.chars().next() {
        let mut frames = Deserialiser::new(&input[tag.len_utf8()..]);
        let payload = frames
            .next_field()?
            .ok_or(PrereqError::MissingPayload(tag))?;
        input = frames.remaining();

        let node = match tag {
            LEAF_TAG => PrereqTree::Leaf(ModuleCode::new(payload)?),
            ALL_OF_TAG => PrereqTree::Group(Combinator::AllOf, decode_nodes(&payload, depth + 1)?),
            ANY_OF_TAG => PrereqTree::Group(Combinator::AnyOf, decode_nodes(&payload, depth + 1)?),
            other => return Err(PrereqError::UnknownTag(other)),
        };
        nodes.push(node);
    }
    Ok(nodes)
}
