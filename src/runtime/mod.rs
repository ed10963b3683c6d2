//! Runtime: values, lexical environments, and the tree-walking evaluator.

pub mod env;
pub mod eval;
pub mod value;

pub use env::{EnvHandle, Environment, Function, UserFunction};
pub use eval::{evaluate, EvalContext, MAX_CALL_DEPTH};
pub use value::Value;
