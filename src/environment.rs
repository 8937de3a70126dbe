//! Lexical environments: a binding map with an optional parent chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// A fresh root environment with no parent.
    pub fn root() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A child environment whose lookups fall back to `parent`.
    pub fn enclosed(parent: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
        }))
    }

    /// Binds a name in this environment, shadowing any outer binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Walks the parent chain for the nearest binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .parent
                .as_ref()
                .and_then(|parent| parent.borrow().lookup(name)),
        }
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.parent.clone()
    }

    /// Copies the local bindings into a new environment sharing the same
    /// parent. Partial application binds prefix arguments in such a copy, so
    /// later calls of the original function are untouched.
    pub fn clone_local(&self) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            bindings: self.bindings.clone(),
            parent: self.parent.clone(),
        }))
    }
}
