//! # JEXL Macro System
//!
//! Macros are user-defined syntactic forms, eliminated from the expression
//! tree by substitution before evaluation begins. The expander never
//! evaluates anything: macro arguments are spliced into the body as
//! unevaluated expressions.

pub mod expander;

pub use expander::expand;

use std::collections::HashMap;

use crate::ast::{Expr, Param};

/// Upper bound on expansion rounds. Macros may expand into further macro
/// invocations, including self-reference; this guard turns runaway recursion
/// into a reportable error instead of a stack overflow.
pub const MAX_EXPANSION_DEPTH: usize = 128;

/// A declared macro: parameter names plus an unexpanded body template.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroDefinition {
    pub name: String,
    pub params: Vec<String>,
    pub body: Expr,
}

impl MacroDefinition {
    pub fn from_parts(name: &str, params: &[Param], body: &Expr) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.name().to_string()).collect(),
            body: body.clone(),
        }
    }
}

/// Mapping from macro name to definition, collected from `macro` forms
/// before expansion. A later definition of the same name shadows an earlier
/// one.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: HashMap<String, MacroDefinition>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every `macro` definition from a top-level sequence.
    pub fn collect(exprs: &[Expr]) -> Self {
        let mut table = Self::new();
        table.extend_from(exprs);
        table
    }

    /// Adds the `macro` definitions found in `exprs` to this table.
    pub fn extend_from(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            if let Expr::MacroDef { name, params, body } = expr {
                self.define(MacroDefinition::from_parts(name, params, body));
            }
        }
    }

    pub fn define(&mut self, definition: MacroDefinition) {
        self.macros.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.macros.keys().cloned().collect()
    }
}
