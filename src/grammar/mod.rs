//! # JEXL Grammar
//!
//! Recognizes whether a parsed JSON value is a syntactically valid program,
//! and lowers it into the typed [`Program`](crate::ast::Program) tree.
//!
//! The decision is total: validation always terminates and never evaluates
//! user values. The grammar only constrains shape - name resolution happens
//! at evaluation time. On rejection, errors carry a JSON-pointer path and a
//! human-readable reason naming the shapes that were tried.
//!
//! The full grammar can also be serialized as a standalone JSON-Schema
//! artifact for external tooling; see [`export`].

pub mod export;
pub mod parser;

pub use export::grammar_schema;
pub use parser::parse_program;

use serde_json::Value as JsonValue;

use crate::errors::JexlError;

/// Decides membership of `document` in the program grammar.
///
/// This is the decision-only view of [`parse_program`]; the lowered tree is
/// discarded.
pub fn validate(document: &JsonValue) -> Result<(), JexlError> {
    parse_program(document).map(|_| ())
}
