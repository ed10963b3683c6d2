//! # Execution Pipeline
//!
//! Unified program runner enforcing strict layering:
//! Validate -> Check type schemas -> Expand -> Evaluate.
//!
//! No side effect occurs before grammar and schema validation pass; the
//! first fatal error halts the run and is surfaced with enough context to
//! diagnose.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::ast::{Module, Program};
use crate::atoms::{canonical_registry, BuiltinRegistry, SharedOutput};
use crate::errors::{ErrorKind, JexlError};
use crate::grammar;
use crate::macros::{expand, MacroTable};
use crate::runtime::env::Environment;
use crate::runtime::eval::{evaluate, EvalContext, MAX_CALL_DEPTH};
use crate::runtime::value::Value;
use crate::schema::{self, MetaschemaValidator, SchemaValidator};

/// The program runner: an immutable-after-construction bundle of the builtin
/// registry, the external schema validator, and the depth limit.
pub struct Engine {
    pub builtins: BuiltinRegistry,
    pub validator: Box<dyn SchemaValidator>,
    pub max_depth: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            builtins: canonical_registry(),
            validator: Box::new(MetaschemaValidator),
            max_depth: MAX_CALL_DEPTH,
        }
    }
}

impl Engine {
    /// An engine with a caller-supplied schema validator collaborator.
    pub fn with_validator(validator: Box<dyn SchemaValidator>) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// Executes JSON source text through the complete pipeline.
    ///
    /// The textual parse itself is delegated to the host JSON parser; its
    /// failure is reported as a malformed document.
    pub fn run_str(&self, source: &str, output: SharedOutput) -> Result<Value, JexlError> {
        let document: JsonValue = serde_json::from_str(source).map_err(|error| {
            JexlError::new(ErrorKind::MalformedDocument {
                message: error.to_string(),
            })
        })?;
        self.run_value(&document, output)
    }

    /// Executes a parsed JSON document through the complete pipeline.
    pub fn run_value(&self, document: &JsonValue, output: SharedOutput) -> Result<Value, JexlError> {
        let program = grammar::parse_program(document)?;
        schema::check_program_types(&program, &*self.validator)?;
        self.run_program(program, output)
    }

    /// Executes an already shape-valid, schema-checked program.
    ///
    /// Returns the value of the last top-level expression, or null for an
    /// empty program.
    pub fn run_program(&self, program: Program, output: SharedOutput) -> Result<Value, JexlError> {
        // The macro table is collected from definitions present before any
        // expansion; definitions are consumed, not executed.
        let table = MacroTable::collect(&program.body);

        let modules = self.expand_modules(program.modules, &table)?;
        let body = program
            .body
            .iter()
            .filter(|expr| !expr.is_macro_def())
            .map(|expr| expand(expr, &table))
            .collect::<Result<Vec<_>, _>>()?;

        let globals = Environment::root();
        self.builtins.install(&globals);
        let mut context = EvalContext::new(globals.clone(), modules, output)
            .with_max_depth(self.max_depth);

        let mut last = Value::Null;
        for expr in &body {
            last = evaluate(expr, &globals, &mut context)?;
        }
        Ok(last)
    }

    /// Expands every module's exports up front. A module's own macro
    /// definitions extend the program-level table within that module.
    fn expand_modules(
        &self,
        modules: BTreeMap<String, Module>,
        table: &MacroTable,
    ) -> Result<BTreeMap<String, Module>, JexlError> {
        let mut expanded = BTreeMap::new();
        for (name, module) in modules {
            let mut module_table = table.clone();
            module_table.extend_from(&module.exports);
            let exports = module
                .exports
                .iter()
                .filter(|expr| !expr.is_macro_def())
                .map(|expr| expand(expr, &module_table))
                .collect::<Result<Vec<_>, _>>()?;
            expanded.insert(
                name,
                Module {
                    types: module.types,
                    exports,
                },
            );
        }
        Ok(expanded)
    }
}

/// Executes source text with a default engine.
pub fn run_source(source: &str, output: SharedOutput) -> Result<Value, JexlError> {
    Engine::default().run_str(source, output)
}
