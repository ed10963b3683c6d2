//! # JEXL Builtin System
//!
//! Builtins are the primitive operations installed into the root environment
//! at startup. They are the only functions not definable by programs.
//!
//! ## Module Structure
//!
//! - **`helpers`**: Shared infrastructure for all builtins
//! - **`math`**: Arithmetic operations (`add`, `subtract`, ...)
//! - **`logic`**: Comparison and equality (`equals`, `lessThan`, ...)
//! - **`string`**: String operations (`concat`)
//! - **`external`**: Side-effecting interface (`print`)
//!
//! ## Design Principles
//!
//! - **Immutable after init**: the registry is populated once and treated as
//!   read-only; evaluation never mutates it
//! - **Consistent Interface**: all builtins use the same [`BuiltinFn`]
//!   signature and receive already-evaluated values

use std::cell::RefCell;
use std::rc::Rc;

use im::HashMap;

use crate::errors::JexlError;
use crate::runtime::env::{EnvHandle, Function};
use crate::runtime::eval::EvalContext;
use crate::runtime::value::Value;

// ============================================================================
// CORE TYPES AND TRAITS
// ============================================================================

/// Builtin function type: receives evaluated argument values and the current
/// evaluation context (for side-effecting output).
pub type BuiltinFn = fn(args: &[Value], context: &mut EvalContext) -> Result<Value, JexlError>;

/// Output sink for `print`, to make I/O testable and injectable.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// A null output sink for running without output.
pub struct NullSink;
impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) {}
}

/// Writes output lines to stdout, for embedding hosts that want direct
/// console behavior.
pub struct StdoutSink;
impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Collects output into a string for tests or programmatic capture.
#[derive(Default)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

/// Shared, interior-mutable handle to an output sink.
pub type SharedOutput = Rc<RefCell<dyn OutputSink>>;

pub fn shared_output(sink: impl OutputSink + 'static) -> SharedOutput {
    Rc::new(RefCell::new(sink))
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Registry for all builtins, inspectable at runtime.
#[derive(Default, Clone)]
pub struct BuiltinRegistry {
    builtins: HashMap<String, BuiltinFn>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        self.builtins.get(name).copied()
    }

    pub fn register(&mut self, name: &str, func: BuiltinFn) {
        self.builtins.insert(name.to_string(), func);
    }

    pub fn has(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn list(&self) -> Vec<String> {
        self.builtins.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }

    /// Installs every registered builtin into `env`'s current frame as a
    /// function binding.
    pub fn install(&self, env: &EnvHandle) {
        let mut env = env.borrow_mut();
        for (name, func) in self.builtins.iter() {
            env.define_function(
                name.clone(),
                Function::Builtin {
                    name: name.clone(),
                    func: *func,
                },
            );
        }
    }
}

// ============================================================================
// MODULAR BUILTIN IMPLEMENTATIONS
// ============================================================================

// Core infrastructure shared by all builtins
pub mod helpers;

// Domain-specific builtin modules
pub mod external;
pub mod logic;
pub mod math;
pub mod string;

// ============================================================================
// UNIFIED REGISTRATION FUNCTION
// ============================================================================

/// Registers all standard builtins from all modules with the given registry.
pub fn register_all_builtins(registry: &mut BuiltinRegistry) {
    math::register_math_builtins(registry);
    logic::register_logic_builtins(registry);
    string::register_string_builtins(registry);
    external::register_external_builtins(registry);
}

/// Builds the canonical registry used by a default engine.
pub fn canonical_registry() -> BuiltinRegistry {
    let mut registry = BuiltinRegistry::new();
    register_all_builtins(&mut registry);
    registry
}
