//! Shared infrastructure for builtin implementations.

use crate::errors::JexlError;
use crate::runtime::value::Value;

/// Extracts a number from a value, or reports a type mismatch naming the
/// builtin that required it.
pub fn extract_number(value: &Value, builtin_name: &str) -> Result<f64, JexlError> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(JexlError::type_mismatch(
            builtin_name,
            "Number",
            other.type_name(),
        )),
    }
}

/// Checks an exact argument count.
pub fn require_arity(builtin_name: &str, expected: usize, args: &[Value]) -> Result<(), JexlError> {
    if args.len() != expected {
        return Err(JexlError::arity_mismatch(builtin_name, expected, args.len()));
    }
    Ok(())
}

/// Checks a minimum argument count.
pub fn require_at_least(
    builtin_name: &str,
    minimum: usize,
    args: &[Value],
) -> Result<(), JexlError> {
    if args.len() < minimum {
        return Err(JexlError::arity_mismatch(builtin_name, minimum, args.len()));
    }
    Ok(())
}
