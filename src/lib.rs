//! # JEXL
//!
//! A small expression language whose concrete syntax is JSON: every program
//! is a JSON document, every expression a JSON literal, a single-key form,
//! or a definition record. The engine validates the document against the
//! grammar, checks declared type schemas, expands user-defined macros by
//! substitution, and evaluates the result with lexical scoping.

pub use crate::errors::{ErrorCategory, ErrorKind, JexlError};

pub mod ast;
pub mod atoms;
pub mod engine;
pub mod errors;
pub mod grammar;
pub mod macros;
pub mod runtime;
pub mod schema;

/// The single grammar version this engine accepts.
pub const JEXL_VERSION: &str = "v0.1";
