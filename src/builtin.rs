//! Builtin functions, kept in a registry the evaluator consults when an
//! identifier has no binding. Builtins receive the evaluator so they can call
//! back into user functions.

use std::collections::HashMap;

use crate::evaluator::Evaluator;
use crate::value::{EvalError, EvalResult, ListValue, Value};

pub type BuiltinFn = fn(&mut Evaluator, &[Value]) -> EvalResult;

pub struct BuiltinRegistry {
    fns: HashMap<String, BuiltinFn>,
}

impl BuiltinRegistry {
    /// The standard set every interpreter starts with.
    pub fn standard() -> Self {
        let mut registry = Self {
            fns: HashMap::new(),
        };
        registry.register("add", add);
        registry.register("eq", eq);
        registry.register("map", map);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, function: BuiltinFn) {
        self.fns.insert(name.into(), function);
    }

    pub fn lookup(&self, name: &str) -> Option<BuiltinFn> {
        self.fns.get(name).copied()
    }
}

/// Adds exactly two integers.
fn add(_: &mut Evaluator, arguments: &[Value]) -> EvalResult {
    let (left, right) = match arguments {
        [left, right] => (left, right),
        _ => {
            return Err(EvalError::Arity {
                expected: 2,
                got: arguments.len(),
            })
        }
    };

    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
        (a, b) => Err(EvalError::Type(format!(
            "add expects integers, but got {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Structural equality over same-kind pairs of integers, floats, booleans
/// and strings. Mismatched or unsupported kinds are an error.
fn eq(_: &mut Evaluator, arguments: &[Value]) -> EvalResult {
    let (left, right) = match arguments {
        [left, right] => (left, right),
        _ => {
            return Err(EvalError::Arity {
                expected: 2,
                got: arguments.len(),
            })
        }
    };

    let equal = match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (a, b) => {
            return Err(EvalError::Type(format!(
                "cannot compare {} and {}",
                a.type_name(),
                b.type_name()
            )))
        }
    };

    Ok(Value::Boolean(equal))
}

/// Applies a user function to every element of an array or list; the result
/// keeps the input's container kind.
fn map(evaluator: &mut Evaluator, arguments: &[Value]) -> EvalResult {
    let (function, sequence) = match arguments {
        [function, sequence] => (function, sequence),
        _ => {
            return Err(EvalError::Arity {
                expected: 2,
                got: arguments.len(),
            })
        }
    };

    match function {
        Value::Function(_) => {}
        other => {
            return Err(EvalError::Type(format!(
                "map expects a function, but got {}",
                other.type_name()
            )))
        }
    }

    match sequence {
        Value::Array { size, elements } => {
            let mut mapped = Vec::with_capacity(elements.len());
            for element in elements {
                mapped.push(evaluator.apply(function.clone(), vec![element.clone()])?);
            }
            Ok(Value::Array {
                size: *size,
                elements: mapped,
            })
        }
        Value::List(list) => {
            let mut mapped = Vec::with_capacity(list.size() as usize);
            for element in list.iter() {
                mapped.push(evaluator.apply(function.clone(), vec![element.clone()])?);
            }
            Ok(Value::List(ListValue::from_values(mapped)))
        }
        other => Err(EvalError::Type(format!(
            "map expects an array or a list, but got {}",
            other.type_name()
        ))),
    }
}
