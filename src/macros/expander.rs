//! The expansion engine: recursive, top-down macro elimination.
//!
//! Expansion order is outer invocation first, then recursive re-expansion of
//! the substituted result. Substitution is non-hygienic: a bound parameter
//! name is replaced wherever it occurs as a variable reference in the body,
//! with no alpha-renaming, so an argument referencing an outer-scope
//! variable of a colliding name is captured.
//!
//! After expansion succeeds, no single-key form left in the tree names a
//! macro present in the supplied table; function calls and special forms are
//! left structurally intact with only their nested expressions rewritten.

use std::collections::HashMap;

use crate::ast::Expr;
use crate::errors::{ErrorKind, JexlError};
use crate::macros::{MacroDefinition, MacroTable, MAX_EXPANSION_DEPTH};

/// Public entry point: expands all macro invocations in `expr`.
pub fn expand(expr: &Expr, table: &MacroTable) -> Result<Expr, JexlError> {
    expand_at(expr, table, 0)
}

fn expand_at(expr: &Expr, table: &MacroTable, depth: usize) -> Result<Expr, JexlError> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(JexlError::new(ErrorKind::RecursionLimit {
            limit: MAX_EXPANSION_DEPTH,
        }));
    }

    match expr {
        // Positional macro invocation: the call shape with a known target.
        Expr::Call { target, args } => match table.get(target) {
            Some(definition) => {
                let bindings = bind_positional(definition, args)?;
                let substituted = substitute(&definition.body, &bindings);
                expand_at(&substituted, table, depth + 1)
            }
            None => expand_children(expr, table, depth),
        },
        // Record-shaped macro invocation: custom surface syntax binding
        // parameters by field name.
        Expr::SpecialForm { name, fields } => match table.get(name) {
            Some(definition) => {
                let bindings = bind_named(definition, fields)?;
                let substituted = substitute(&definition.body, &bindings);
                expand_at(&substituted, table, depth + 1)
            }
            None => expand_children(expr, table, depth),
        },
        _ => expand_children(expr, table, depth),
    }
}

/// Rebuilds a non-invocation node, expanding every nested expression.
///
/// Structural descent does not consume expansion depth; the depth counter
/// tracks substitution rounds only, so arbitrarily deep macro-free trees
/// pass through unchanged.
fn expand_children(expr: &Expr, table: &MacroTable, depth: usize) -> Result<Expr, JexlError> {
    match expr {
        Expr::Literal(_) | Expr::VarRef { .. } | Expr::Import { .. } => Ok(expr.clone()),

        // Macro bodies are templates, not code; they are consumed by the
        // table and never expanded in place.
        Expr::MacroDef { .. } => Ok(expr.clone()),

        Expr::Let { name, value } => Ok(Expr::Let {
            name: name.clone(),
            value: Box::new(expand_at(value, table, depth)?),
        }),
        Expr::Do { body } => Ok(Expr::Do {
            body: expand_all(body, table, depth)?,
        }),
        Expr::If {
            condition,
            then_branch,
            else_branch,
        } => Ok(Expr::If {
            condition: Box::new(expand_at(condition, table, depth)?),
            then_branch: expand_optional(then_branch, table, depth)?,
            else_branch: expand_optional(else_branch, table, depth)?,
        }),
        Expr::FunctionDef { name, params, body } => Ok(Expr::FunctionDef {
            name: name.clone(),
            params: params.clone(),
            body: Box::new(expand_at(body, table, depth)?),
        }),
        Expr::Call { target, args } => Ok(Expr::Call {
            target: target.clone(),
            args: expand_all(args, table, depth)?,
        }),
        Expr::SpecialForm { name, fields } => Ok(Expr::SpecialForm {
            name: name.clone(),
            fields: fields
                .iter()
                .map(|(key, field)| expand_at(field, table, depth).map(|e| (key.clone(), e)))
                .collect::<Result<Vec<_>, _>>()?,
        }),
    }
}

fn expand_all(exprs: &[Expr], table: &MacroTable, depth: usize) -> Result<Vec<Expr>, JexlError> {
    exprs
        .iter()
        .map(|expr| expand_at(expr, table, depth))
        .collect()
}

fn expand_optional(
    branch: &Option<Box<Expr>>,
    table: &MacroTable,
    depth: usize,
) -> Result<Option<Box<Expr>>, JexlError> {
    branch
        .as_ref()
        .map(|expr| expand_at(expr, table, depth).map(Box::new))
        .transpose()
}

// ============================================================================
// PARAMETER BINDING
// ============================================================================

/// Binds each declared parameter to the unevaluated positional argument.
fn bind_positional(
    definition: &MacroDefinition,
    args: &[Expr],
) -> Result<HashMap<String, Expr>, JexlError> {
    if args.len() != definition.params.len() {
        return Err(JexlError::arity_mismatch(
            &definition.name,
            definition.params.len(),
            args.len(),
        ));
    }
    Ok(definition
        .params
        .iter()
        .cloned()
        .zip(args.iter().cloned())
        .collect())
}

/// Binds declared parameters by field name for record-shaped invocations.
fn bind_named(
    definition: &MacroDefinition,
    fields: &[(String, Expr)],
) -> Result<HashMap<String, Expr>, JexlError> {
    if fields.len() != definition.params.len() {
        return Err(JexlError::arity_mismatch(
            &definition.name,
            definition.params.len(),
            fields.len(),
        ));
    }
    let mut bindings = HashMap::new();
    for param in &definition.params {
        let Some((_, arg)) = fields.iter().find(|(key, _)| key == param) else {
            return Err(JexlError::new(ErrorKind::GrammarViolation {
                expected: format!(
                    "arguments {{{}}} for macro '{}'",
                    definition.params.join(", "),
                    definition.name
                ),
                found: format!(
                    "arguments {{{}}}",
                    fields
                        .iter()
                        .map(|(key, _)| key.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }));
        };
        bindings.insert(param.clone(), arg.clone());
    }
    Ok(bindings)
}

// ============================================================================
// TEMPLATE SUBSTITUTION
// ============================================================================

/// Recursively substitutes bound variable references in a macro body with
/// the corresponding argument expressions. Total: substitution itself cannot
/// fail, only binding and re-expansion can.
fn substitute(body: &Expr, bindings: &HashMap<String, Expr>) -> Expr {
    match body {
        Expr::VarRef { name } => match bindings.get(name) {
            Some(argument) => argument.clone(),
            None => body.clone(),
        },
        Expr::Literal(_) | Expr::Import { .. } => body.clone(),

        Expr::Let { name, value } => Expr::Let {
            // The bound name itself is not a reference; it stays untouched
            // even when it collides with a parameter.
            name: name.clone(),
            value: Box::new(substitute(value, bindings)),
        },
        Expr::Do { body } => Expr::Do {
            body: body.iter().map(|e| substitute(e, bindings)).collect(),
        },
        Expr::If {
            condition,
            then_branch,
            else_branch,
        } => Expr::If {
            condition: Box::new(substitute(condition, bindings)),
            then_branch: then_branch
                .as_ref()
                .map(|branch| Box::new(substitute(branch, bindings))),
            else_branch: else_branch
                .as_ref()
                .map(|branch| Box::new(substitute(branch, bindings))),
        },
        Expr::FunctionDef { name, params, body } => Expr::FunctionDef {
            name: name.clone(),
            params: params.clone(),
            body: Box::new(substitute(body, bindings)),
        },
        Expr::MacroDef { name, params, body } => Expr::MacroDef {
            name: name.clone(),
            params: params.clone(),
            body: Box::new(substitute(body, bindings)),
        },
        Expr::Call { target, args } => Expr::Call {
            target: target.clone(),
            args: args.iter().map(|e| substitute(e, bindings)).collect(),
        },
        Expr::SpecialForm { name, fields } => Expr::SpecialForm {
            name: name.clone(),
            fields: fields
                .iter()
                .map(|(key, field)| (key.clone(), substitute(field, bindings)))
                .collect(),
        },
    }
}
