//! # Arithmetic Builtins
//!
//! All builtins in this module are pure functions over `Value::Number` (f64)
//! operands. Division by zero is a runtime error, not an infinity.

use crate::atoms::helpers::{extract_number, require_at_least};
use crate::atoms::{BuiltinFn, BuiltinRegistry};
use crate::errors::{ErrorKind, JexlError};
use crate::runtime::value::Value;

/// Adds numbers.
///
/// Usage: {"add": [<a>, <b>, ...]}
///
/// Example:
///   {"add": [1, 2, 3]} ; => 6
pub const BUILTIN_ADD: BuiltinFn = |args, _context| {
    let mut sum = 0.0;
    for arg in args {
        sum += extract_number(arg, "add")?;
    }
    Ok(Value::Number(sum))
};

/// Subtracts the remaining arguments from the first; with one argument,
/// negates it.
///
/// Usage: {"subtract": [<a>, <b>, ...]}
///
/// Example:
///   {"subtract": [5, 2]} ; => 3
pub const BUILTIN_SUBTRACT: BuiltinFn = |args, _context| {
    require_at_least("subtract", 1, args)?;

    let first = extract_number(&args[0], "subtract")?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }

    let mut result = first;
    for arg in &args[1..] {
        result -= extract_number(arg, "subtract")?;
    }
    Ok(Value::Number(result))
};

/// Multiplies numbers.
///
/// Usage: {"multiply": [<a>, <b>, ...]}
///
/// Example:
///   {"multiply": [2, 3, 4]} ; => 24
pub const BUILTIN_MULTIPLY: BuiltinFn = |args, _context| {
    let mut product = 1.0;
    for arg in args {
        product *= extract_number(arg, "multiply")?;
    }
    Ok(Value::Number(product))
};

/// Divides the first argument by the remaining ones.
///
/// Usage: {"divide": [<a>, <b>, ...]}
///
/// Example:
///   {"divide": [6, 2]} ; => 3
///
/// Note: errors on division by zero.
pub const BUILTIN_DIVIDE: BuiltinFn = |args, _context| {
    require_at_least("divide", 2, args)?;

    let mut result = extract_number(&args[0], "divide")?;
    for arg in &args[1..] {
        let divisor = extract_number(arg, "divide")?;
        if divisor == 0.0 {
            return Err(JexlError::new(ErrorKind::DivisionByZero));
        }
        result /= divisor;
    }
    Ok(Value::Number(result))
};

/// Registers all arithmetic builtins with the given registry.
pub fn register_math_builtins(registry: &mut BuiltinRegistry) {
    registry.register("add", BUILTIN_ADD);
    registry.register("subtract", BUILTIN_SUBTRACT);
    registry.register("multiply", BUILTIN_MULTIPLY);
    registry.register("divide", BUILTIN_DIVIDE);
}
