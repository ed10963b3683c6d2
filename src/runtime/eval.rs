//! # The Evaluator
//!
//! Lexically-scoped tree-walking execution over macro-expanded expression
//! trees. `evaluate` is total over well-formed, fully expanded input and
//! fails with a contextual error otherwise.
//!
//! Evaluation is single-threaded and synchronous; the only unbounded
//! resource is call depth, guarded by an explicit limit surfaced as a
//! distinct error kind.

use std::collections::{BTreeMap, HashMap};

use crate::ast::{Expr, Module};
use crate::atoms::SharedOutput;
use crate::errors::{ErrorKind, JexlError};
use crate::runtime::env::{EnvHandle, Environment, Function, UserFunction};
use crate::runtime::value::Value;

/// Default bound on user-function call depth.
pub const MAX_CALL_DEPTH: usize = 512;

/// Evaluation state threaded through every call: the global frame (for
/// module loading), the declared modules, the output sink, and the call
/// depth guard.
pub struct EvalContext {
    pub globals: EnvHandle,
    pub modules: BTreeMap<String, Module>,
    pub output: SharedOutput,
    pub depth: usize,
    pub max_depth: usize,
    /// Modules whose exports have already been evaluated, keyed by name.
    loaded: HashMap<String, EnvHandle>,
}

impl EvalContext {
    pub fn new(globals: EnvHandle, modules: BTreeMap<String, Module>, output: SharedOutput) -> Self {
        Self {
            globals,
            modules,
            output,
            depth: 0,
            max_depth: MAX_CALL_DEPTH,
            loaded: HashMap::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Core recursive evaluator: `evaluate(expr, env) -> Value`.
pub fn evaluate(expr: &Expr, env: &EnvHandle, context: &mut EvalContext) -> Result<Value, JexlError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::VarRef { name } => env
            .borrow()
            .get_var(name)
            .ok_or_else(|| JexlError::unbound_variable(name)),

        // Let is an expression: the evaluated value is both bound and
        // returned.
        Expr::Let { name, value } => {
            let value = evaluate(value, env, context)?;
            env.borrow_mut().set_var(name.clone(), value.clone());
            Ok(value)
        }

        Expr::Do { body } => {
            let mut last = Value::Null;
            for item in body {
                last = evaluate(item, env, context)?;
            }
            Ok(last)
        }

        Expr::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let branch = if evaluate(condition, env, context)?.is_truthy() {
                then_branch
            } else {
                else_branch
            };
            match branch {
                Some(branch) => evaluate(branch, env, context),
                None => Ok(Value::Null),
            }
        }

        Expr::FunctionDef { name, params, body } => {
            let function = UserFunction {
                name: name.clone(),
                params: params.clone(),
                body: (**body).clone(),
                env: env.clone(),
            };
            env.borrow_mut()
                .define_function(name.clone(), Function::User(function.into()));
            Ok(Value::Null)
        }

        // Macro definitions are consumed by the expander; one surviving to
        // evaluation means the pipeline was bypassed.
        Expr::MacroDef { name, .. } => Err(JexlError::new(ErrorKind::MacroNotExpanded {
            name: name.clone(),
        })),

        Expr::Import { module, symbols } => import_module(module, symbols, env, context),

        Expr::Call { target, args } => {
            // Arguments evaluate left-to-right before the callee is resolved.
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, env, context)?);
            }
            let function = env
                .borrow()
                .get_function(target)
                .ok_or_else(|| JexlError::unbound_function(target))?;
            apply(&function, &values, context)
        }

        Expr::SpecialForm { name, .. } => Err(JexlError::unsupported_operation(name)),
    }
}

/// Invokes a resolved function with already-evaluated arguments.
pub fn apply(
    function: &Function,
    args: &[Value],
    context: &mut EvalContext,
) -> Result<Value, JexlError> {
    match function {
        Function::Builtin { func, .. } => func(args, context),
        Function::User(function) => {
            if args.len() != function.params.len() {
                return Err(JexlError::arity_mismatch(
                    &function.name,
                    function.params.len(),
                    args.len(),
                ));
            }
            if context.depth >= context.max_depth {
                return Err(JexlError::new(ErrorKind::RecursionLimit {
                    limit: context.max_depth,
                }));
            }

            // Fresh per-call frame under the defining environment; parameter
            // binding shadows, never mutates.
            let frame = Environment::child(&function.env);
            {
                let mut frame = frame.borrow_mut();
                for (param, value) in function.params.iter().zip(args) {
                    frame.set_var(param.name(), value.clone());
                }
            }

            context.depth += 1;
            let result = evaluate(&function.body, &frame, context);
            context.depth -= 1;
            result
        }
    }
}

/// Resolves a declared module, evaluating its exports once in a frame under
/// the globals, and binds the requested symbols into the importing frame.
fn import_module(
    module: &str,
    symbols: &[String],
    env: &EnvHandle,
    context: &mut EvalContext,
) -> Result<Value, JexlError> {
    if !context.loaded.contains_key(module) {
        let declared = context
            .modules
            .get(module)
            .cloned()
            .ok_or_else(|| {
                JexlError::new(ErrorKind::UnknownModule {
                    module: module.to_string(),
                })
            })?;

        let frame = Environment::child(&context.globals);
        // Registered before evaluation so a self-importing module terminates.
        context.loaded.insert(module.to_string(), frame.clone());
        for export in &declared.exports {
            evaluate(export, &frame, context)?;
        }
    }

    let frame = context.loaded[module].clone();
    for symbol in symbols {
        let (function, variable) = {
            let frame = frame.borrow();
            let function = frame
                .has_local_function(symbol)
                .then(|| frame.get_function(symbol))
                .flatten();
            let variable = frame
                .has_local_var(symbol)
                .then(|| frame.get_var(symbol))
                .flatten();
            (function, variable)
        };

        if function.is_none() && variable.is_none() {
            return Err(JexlError::new(ErrorKind::UnknownExport {
                module: module.to_string(),
                symbol: symbol.clone(),
            }));
        }
        if let Some(function) = function {
            env.borrow_mut().define_function(symbol.clone(), function);
        }
        if let Some(variable) = variable {
            env.borrow_mut().set_var(symbol.clone(), variable);
        }
    }

    Ok(Value::Null)
}
