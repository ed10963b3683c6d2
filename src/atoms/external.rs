//! # Side-Effecting Builtins
//!
//! The only observable side effect a program can have is output, routed
//! through the evaluation context's injected sink.

use crate::atoms::{BuiltinFn, BuiltinRegistry};
use crate::runtime::value::Value;

/// Stringifies the arguments, joins them with spaces, and emits the line to
/// the output sink. Returns null.
///
/// Usage: {"print": [<a>, <b>, ...]}
pub const BUILTIN_PRINT: BuiltinFn = |args, context| {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    context.output.borrow_mut().emit(&line);
    Ok(Value::Null)
};

/// Registers all side-effecting builtins with the given registry.
pub fn register_external_builtins(registry: &mut BuiltinRegistry) {
    registry.register("print", BUILTIN_PRINT);
}
