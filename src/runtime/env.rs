//! Chained lexical scope frames.
//!
//! An [`Environment`] holds two independent namespaces - variables and
//! functions - so a name may exist in both without collision. Lookup walks
//! the parent chain; writes always land in the current frame, which is the
//! mechanism by which function-call parameter binding creates fresh per-call
//! scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expr, Param};
use crate::atoms::BuiltinFn;
use crate::runtime::value::Value;

/// Shared handle to a scope frame. Frames are linked parent-ward and
/// discarded when the activation that created them completes.
pub type EnvHandle = Rc<RefCell<Environment>>;

/// A user-defined function: parameter names, body, and the environment
/// active at definition time. Free names in the body resolve lexically
/// against that environment.
#[derive(Debug, Clone)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Expr,
    pub env: EnvHandle,
}

/// A callable binding: either a builtin primitive or a user closure.
#[derive(Clone)]
pub enum Function {
    Builtin { name: String, func: BuiltinFn },
    User(Rc<UserFunction>),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Builtin { name, .. } => name,
            Function::User(f) => &f.name,
        }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Builtin { name, .. } => write!(f, "Builtin({})", name),
            Function::User(func) => write!(f, "User({}/{})", func.name, func.params.len()),
        }
    }
}

/// A mutable scope frame with an optional parent.
#[derive(Debug, Default)]
pub struct Environment {
    vars: HashMap<String, Value>,
    functions: HashMap<String, Function>,
    parent: Option<EnvHandle>,
}

impl Environment {
    /// Creates a root frame with no parent.
    pub fn root() -> EnvHandle {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates a fresh frame whose parent is `parent`.
    pub fn child(parent: &EnvHandle) -> EnvHandle {
        Rc::new(RefCell::new(Environment {
            vars: HashMap::new(),
            functions: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Looks up a variable in this frame, then up the parent chain.
    pub fn get_var(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().get_var(name))
    }

    /// Looks up a function in this frame, then up the parent chain.
    pub fn get_function(&self, name: &str) -> Option<Function> {
        if let Some(function) = self.functions.get(name) {
            return Some(function.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().get_function(name))
    }

    /// Writes a variable into the *current* frame, shadowing any ancestor
    /// binding rather than mutating it.
    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Writes a function binding into the *current* frame.
    pub fn define_function(&mut self, name: impl Into<String>, function: Function) {
        self.functions.insert(name.into(), function);
    }

    /// True when the name is bound as a variable in this frame itself.
    pub fn has_local_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// True when the name is bound as a function in this frame itself.
    pub fn has_local_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_the_parent_chain() {
        let root = Environment::root();
        root.borrow_mut().set_var("x", Value::Number(1.0));
        let frame = Environment::child(&root);
        assert_eq!(frame.borrow().get_var("x"), Some(Value::Number(1.0)));
        assert_eq!(frame.borrow().get_var("y"), None);
    }

    #[test]
    fn set_var_shadows_without_mutating_ancestors() {
        let root = Environment::root();
        root.borrow_mut().set_var("x", Value::Number(1.0));
        let frame = Environment::child(&root);
        frame.borrow_mut().set_var("x", Value::Number(2.0));
        assert_eq!(frame.borrow().get_var("x"), Some(Value::Number(2.0)));
        assert_eq!(root.borrow().get_var("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn variables_and_functions_do_not_collide() {
        let root = Environment::root();
        root.borrow_mut().set_var("f", Value::String("data".into()));
        root.borrow_mut().define_function(
            "f",
            Function::Builtin {
                name: "f".to_string(),
                func: |_, _| Ok(Value::Null),
            },
        );
        assert!(root.borrow().get_var("f").is_some());
        assert!(root.borrow().get_function("f").is_some());
    }
}
