//! # String Builtins

use crate::atoms::{BuiltinFn, BuiltinRegistry};
use crate::runtime::value::Value;

/// Stringifies every argument and joins the results.
///
/// Usage: {"concat": [<a>, <b>, ...]}
///
/// Example:
///   {"concat": ["fib = ", 13]} ; => "fib = 13"
pub const BUILTIN_CONCAT: BuiltinFn = |args, _context| {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_string());
    }
    Ok(Value::String(out))
};

/// Registers all string builtins with the given registry.
pub fn register_string_builtins(registry: &mut BuiltinRegistry) {
    registry.register("concat", BUILTIN_CONCAT);
}
