//! # JEXL Abstract Syntax
//!
//! The expression tree the engine operates on. Every program is a JSON
//! document; the grammar module lowers that document into the closed [`Expr`]
//! enum defined here, so that the expander and evaluator dispatch on a tagged
//! variant instead of inspecting string keys at runtime.
//!
//! Expression trees are produced once, before evaluation begins, and are
//! never mutated afterward; macro expansion always yields a new tree.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;

use crate::runtime::value::Value;

/// The reserved single-key forms with fixed evaluation semantics. Any other
/// single-key object is a function call or a generic special form.
pub static RESERVED_FORMS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["ref", "let", "do", "if", "function", "macro", "import"]);

pub fn is_reserved_form(name: &str) -> bool {
    RESERVED_FORMS.contains(&name)
}

/// A node in the program's abstract syntax tree.
///
/// One case per reserved form, plus the generic call case and the generic
/// record-shaped fallback form.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A scalar JSON literal: string, number, boolean, or null.
    Literal(Value),
    /// `{"ref": "name"}`
    VarRef { name: String },
    /// `{"let": {"name": ..., "value": ...}}`
    Let { name: String, value: Box<Expr> },
    /// `{"do": [...]}`
    Do { body: Vec<Expr> },
    /// `{"if": {"condition": ..., "true": ..., "false": ...}}`
    If {
        condition: Box<Expr>,
        then_branch: Option<Box<Expr>>,
        else_branch: Option<Box<Expr>>,
    },
    /// `{"function": {"name": ..., "params": [...], "body": ...}}`
    FunctionDef {
        name: String,
        params: Vec<Param>,
        body: Box<Expr>,
    },
    /// `{"macro": {"name": ..., "params": [...], "body": ...}}`
    ///
    /// Consumed by the expander before evaluation; one reaching the
    /// evaluator is an error.
    MacroDef {
        name: String,
        params: Vec<Param>,
        body: Box<Expr>,
    },
    /// `{"import": {"module": ..., "symbols": [...]}}`
    Import { module: String, symbols: Vec<String> },
    /// Any other single-key object mapping a name to a sequence of argument
    /// expressions.
    Call { target: String, args: Vec<Expr> },
    /// Fallback for a single-key object mapping a name to a string-keyed
    /// record. Used by macros with custom surface syntax that does not fit
    /// the positional call shape.
    SpecialForm {
        name: String,
        fields: Vec<(String, Expr)>,
    },
}

impl Expr {
    pub fn is_macro_def(&self) -> bool {
        matches!(self, Expr::MacroDef { .. })
    }

    /// Short shape name used in diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "Literal",
            Expr::VarRef { .. } => "VarReference",
            Expr::Let { .. } => "LetBinding",
            Expr::Do { .. } => "DoDef",
            Expr::If { .. } => "IfDef",
            Expr::FunctionDef { .. } => "FunctionDef",
            Expr::MacroDef { .. } => "MacroDef",
            Expr::Import { .. } => "Import",
            Expr::Call { .. } => "FunctionCall",
            Expr::SpecialForm { .. } => "SpecialForm",
        }
    }
}

/// A declared parameter: either a bare name, or a single-entry mapping from
/// name to an element type name. Only the name is used by evaluation; the
/// type annotation is advisory.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Named(String),
    Typed { name: String, type_ref: String },
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Named(name) => name,
            Param::Typed { name, .. } => name,
        }
    }
}

/// A named bundle of exported expressions plus optional locally-declared
/// types, referenced by `import`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub types: BTreeMap<String, JsonValue>,
    pub exports: Vec<Expr>,
}

/// A whole validated program document.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The grammar version tag; always equal to the engine's supported
    /// literal once the program has passed validation.
    pub version: String,
    pub name: String,
    /// Declared type schemas, validated for well-formedness only.
    pub types: BTreeMap<String, JsonValue>,
    pub modules: BTreeMap<String, Module>,
    /// Top-level expressions, executed in order.
    pub body: Vec<Expr>,
}
