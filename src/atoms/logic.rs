//! # Comparison and Equality Builtins
//!
//! Numeric comparisons expect two numbers; `equals` performs structural
//! equality over any values.

use crate::atoms::helpers::{extract_number, require_arity, require_at_least};
use crate::atoms::{BuiltinFn, BuiltinRegistry};
use crate::runtime::value::Value;

/// Structural equality over any number of values (at least two); true when
/// all are equal.
///
/// Usage: {"equals": [<a>, <b>, ...]}
///
/// Example:
///   {"equals": [1, 2]} ; => false
pub const BUILTIN_EQUALS: BuiltinFn = |args, _context| {
    require_at_least("equals", 2, args)?;
    let all_equal = args.windows(2).all(|pair| pair[0] == pair[1]);
    Ok(Value::Bool(all_equal))
};

/// Numeric less-than.
///
/// Usage: {"lessThan": [<a>, <b>]}
pub const BUILTIN_LESS_THAN: BuiltinFn = |args, _context| {
    require_arity("lessThan", 2, args)?;
    let a = extract_number(&args[0], "lessThan")?;
    let b = extract_number(&args[1], "lessThan")?;
    Ok(Value::Bool(a < b))
};

/// Numeric greater-than.
///
/// Usage: {"greaterThan": [<a>, <b>]}
pub const BUILTIN_GREATER_THAN: BuiltinFn = |args, _context| {
    require_arity("greaterThan", 2, args)?;
    let a = extract_number(&args[0], "greaterThan")?;
    let b = extract_number(&args[1], "greaterThan")?;
    Ok(Value::Bool(a > b))
};

/// Numeric less-than-or-equals.
///
/// Usage: {"lessThanOrEquals": [<a>, <b>]}
pub const BUILTIN_LESS_THAN_OR_EQUALS: BuiltinFn = |args, _context| {
    require_arity("lessThanOrEquals", 2, args)?;
    let a = extract_number(&args[0], "lessThanOrEquals")?;
    let b = extract_number(&args[1], "lessThanOrEquals")?;
    Ok(Value::Bool(a <= b))
};

/// Numeric greater-than-or-equals.
///
/// Usage: {"greaterThanOrEquals": [<a>, <b>]}
pub const BUILTIN_GREATER_THAN_OR_EQUALS: BuiltinFn = |args, _context| {
    require_arity("greaterThanOrEquals", 2, args)?;
    let a = extract_number(&args[0], "greaterThanOrEquals")?;
    let b = extract_number(&args[1], "greaterThanOrEquals")?;
    Ok(Value::Bool(a >= b))
};

/// Truthiness negation, using the engine's pinned truthiness rule.
///
/// Usage: {"not": [<v>]}
pub const BUILTIN_NOT: BuiltinFn = |args, _context| {
    require_arity("not", 1, args)?;
    Ok(Value::Bool(!args[0].is_truthy()))
};

/// Registers all comparison and equality builtins with the given registry.
pub fn register_logic_builtins(registry: &mut BuiltinRegistry) {
    registry.register("equals", BUILTIN_EQUALS);
    registry.register("lessThan", BUILTIN_LESS_THAN);
    registry.register("greaterThan", BUILTIN_GREATER_THAN);
    registry.register("lessThanOrEquals", BUILTIN_LESS_THAN_OR_EQUALS);
    registry.register("greaterThanOrEquals", BUILTIN_GREATER_THAN_OR_EQUALS);
    registry.register("not", BUILTIN_NOT);
}
