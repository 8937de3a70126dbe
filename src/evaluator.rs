//! Tree-walking evaluator.
//!
//! Holds the current environment and swaps it around function calls: a call
//! builds a child of the *captured* environment, installs it for the body,
//! and restores the caller's environment afterwards, error or not.

use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use crate::ast::{
    Application, Array, Conditional, Expression, List, Record, Scope, Selector, SelectorItem,
};
use crate::builtin::BuiltinRegistry;
use crate::environment::{EnvRef, Environment};
use crate::value::{EvalError, EvalResult, FunctionValue, ListValue, Value};

pub struct Evaluator {
    env: EnvRef,
    builtins: BuiltinRegistry,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_env(Environment::root())
    }

    /// An evaluator over a caller-provided environment, for embedding.
    pub fn with_env(env: EnvRef) -> Self {
        Self {
            env,
            builtins: BuiltinRegistry::standard(),
        }
    }

    pub fn env(&self) -> EnvRef {
        Rc::clone(&self.env)
    }

    pub fn builtins_mut(&mut self) -> &mut BuiltinRegistry {
        &mut self.builtins
    }

    pub fn evaluate(&mut self, expression: &Expression) -> EvalResult {
        match expression {
            Expression::Scope(scope) => self.evaluate_scope(scope),
            Expression::Identifier(name) => self.resolve(name),
            Expression::Selector(selector) => self.evaluate_selector(selector),
            Expression::Application(application) => self.evaluate_application(application),
            Expression::Function(function) => Ok(self.close_over(function)),
            Expression::Conditional(conditional) => self.evaluate_conditional(conditional),
            Expression::Record(record) => self.evaluate_record(record),
            Expression::Array(array) => self.evaluate_array(array),
            Expression::List(list) => self.evaluate_list(list),
            Expression::Integer(value) => Ok(Value::Integer(*value)),
            Expression::Float(value) => Ok(Value::Float(*value)),
            Expression::String(value) => Ok(Value::String(value.clone())),
            Expression::Boolean(literal) => Ok(Value::Boolean(literal == "true")),
            Expression::Keyword(literal) => Ok(Value::Keyword(literal.clone())),
        }
    }

    /// Definitions bind into the current environment in order, then the
    /// expressions run; the last expression's value is the scope's value, or
    /// unit when there is none.
    pub fn evaluate_scope(&mut self, scope: &Scope) -> EvalResult {
        for definition in &scope.definitions {
            let value = self.evaluate(&definition.expression)?;
            self.env
                .borrow_mut()
                .define(definition.identifier.clone(), value);
        }

        let mut result = Value::Unit;
        for expression in &scope.expressions {
            result = self.evaluate(expression)?;
        }
        Ok(result)
    }

    fn resolve(&self, name: &str) -> EvalResult {
        if let Some(value) = self.env.borrow().lookup(name) {
            return Ok(value);
        }
        if let Some(builtin) = self.builtins.lookup(name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(EvalError::Unbound(name.to_string()))
    }

    fn evaluate_selector(&mut self, selector: &Selector) -> EvalResult {
        let mut items = selector.items.iter();
        let mut value = match items.next() {
            Some(SelectorItem::Field(name)) => self.resolve(name)?,
            Some(SelectorItem::Index(index)) => {
                return Err(EvalError::Type(format!(
                    "selector cannot start with index {index}"
                )))
            }
            None => return Ok(Value::Unit),
        };

        for item in items {
            value = match (item, value) {
                (SelectorItem::Field(name), Value::Record(fields)) => match fields.get(name) {
                    Some(field) => field.clone(),
                    None => {
                        return Err(EvalError::Type(format!("record has no field `{name}`")))
                    }
                },
                (SelectorItem::Index(index), Value::Array { size, elements }) => {
                    match elements.get(*index as usize) {
                        Some(element) => element.clone(),
                        None => {
                            return Err(EvalError::IndexOutOfBounds {
                                index: *index,
                                size,
                            })
                        }
                    }
                }
                (SelectorItem::Index(index), Value::List(list)) => match list.get(*index) {
                    Some(element) => element.clone(),
                    None => {
                        return Err(EvalError::IndexOutOfBounds {
                            index: *index,
                            size: list.size(),
                        })
                    }
                },
                (SelectorItem::Field(name), other) => {
                    return Err(EvalError::Type(format!(
                        "cannot select field `{name}` from {}",
                        other.type_name()
                    )))
                }
                (SelectorItem::Index(index), other) => {
                    return Err(EvalError::Type(format!(
                        "cannot index {} with {index}",
                        other.type_name()
                    )))
                }
            };
        }

        Ok(value)
    }

    fn evaluate_application(&mut self, application: &Application) -> EvalResult {
        let (callee, arguments) = match application.arguments.split_first() {
            Some(parts) => parts,
            // `()` is the unit literal.
            None => return Ok(Value::Unit),
        };

        let callee = self.evaluate(callee)?;
        match callee {
            Value::Function(function) => {
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }
                self.call(function, values)
            }
            Value::Builtin(builtin) => {
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }
                builtin(self, &values)
            }
            // Applying a non-callable yields it unchanged; the remaining
            // expressions are not evaluated.
            other => Ok(other),
        }
    }

    /// Function call with already evaluated arguments. Fewer arguments than
    /// parameters curries: the prefix is bound into a copy of the captured
    /// environment and a smaller function comes back.
    pub fn apply(&mut self, callee: Value, arguments: Vec<Value>) -> EvalResult {
        match callee {
            Value::Function(function) => self.call(function, arguments),
            Value::Builtin(builtin) => builtin(self, &arguments),
            other => Ok(other),
        }
    }

    fn call(&mut self, function: FunctionValue, arguments: Vec<Value>) -> EvalResult {
        if arguments.len() > function.parameters.len() {
            return Err(EvalError::Arity {
                expected: function.parameters.len(),
                got: arguments.len(),
            });
        }

        if arguments.len() < function.parameters.len() {
            let env = function.env.borrow().clone_local();
            let (bound, remaining) = function.parameters.split_at(arguments.len());
            for (parameter, argument) in bound.iter().zip(arguments) {
                env.borrow_mut().define(parameter.clone(), argument);
            }
            return Ok(Value::Function(FunctionValue {
                parameters: remaining.to_vec(),
                body: function.body,
                env,
            }));
        }

        let env = Environment::enclosed(Rc::clone(&function.env));
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            env.borrow_mut().define(parameter.clone(), argument);
        }

        let saved = mem::replace(&mut self.env, env);
        let result = self.evaluate_scope(&function.body);
        self.env = saved;
        result
    }

    fn close_over(&self, function: &crate::ast::Function) -> Value {
        Value::Function(FunctionValue {
            parameters: function.parameters.clone(),
            body: Rc::clone(&function.body),
            // a fresh child keeps the closure's own locals out of the
            // defining scope and makes the currying copy cheap
            env: Environment::enclosed(Rc::clone(&self.env)),
        })
    }

    fn evaluate_conditional(&mut self, conditional: &Conditional) -> EvalResult {
        match self.evaluate(&conditional.condition)? {
            Value::Boolean(true) => self.evaluate_scope(&conditional.consequence),
            Value::Boolean(false) => self.evaluate_scope(&conditional.alternative),
            other => Err(EvalError::Type(format!(
                "condition must be a boolean, but got {}",
                other.type_name()
            ))),
        }
    }

    fn evaluate_record(&mut self, record: &Record) -> EvalResult {
        let mut fields = HashMap::with_capacity(record.fields.len());
        for (name, expression) in &record.fields {
            fields.insert(name.clone(), self.evaluate(expression)?);
        }
        Ok(Value::Record(fields))
    }

    fn evaluate_array(&mut self, array: &Array) -> EvalResult {
        if array.size != array.elements.len() as u64 {
            return Err(EvalError::ArraySize {
                declared: array.size,
                got: array.elements.len() as u64,
            });
        }
        let mut elements = Vec::with_capacity(array.elements.len());
        for element in &array.elements {
            elements.push(self.evaluate(element)?);
        }
        Ok(Value::Array {
            size: array.size,
            elements,
        })
    }

    fn evaluate_list(&mut self, list: &List) -> EvalResult {
        let mut elements = Vec::with_capacity(list.elements.len());
        for element in &list.elements {
            elements.push(self.evaluate(element)?);
        }
        Ok(Value::List(ListValue::from_values(elements)))
    }
}
