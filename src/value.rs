//! Runtime values and evaluation errors.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{escape_string, Scope};
use crate::builtin::BuiltinFn;
use crate::environment::EnvRef;

pub type EvalResult = Result<Value, EvalError>;

#[derive(Debug, Clone)]
pub enum EvalError {
    Unbound(String),
    Arity { expected: usize, got: usize },
    Type(String),
    IndexOutOfBounds { index: u64, size: u64 },
    ArraySize { declared: u64, got: u64 },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Unbound(name) => write!(f, "unbound identifier `{name}`"),
            EvalError::Arity { expected, got } => {
                write!(f, "function expects {expected} arguments, but got {got}")
            }
            EvalError::Type(message) => write!(f, "{message}"),
            EvalError::IndexOutOfBounds { index, size } => {
                write!(f, "index {index} out of bounds for size {size}")
            }
            EvalError::ArraySize { declared, got } => {
                write!(f, "array declared with size {declared}, but got {got} elements")
            }
        }
    }
}

impl std::error::Error for EvalError {}

#[derive(Clone)]
pub enum Value {
    Unit,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Keyword(String),
    Array { size: u64, elements: Vec<Value> },
    List(ListValue),
    Record(HashMap<String, Value>),
    Function(FunctionValue),
    Builtin(BuiltinFn),
}

/// A closure: the literal's parameters and body plus the environment it was
/// created in. Partial application produces a new one of these with fewer
/// parameters and a pre-populated copy of the environment.
#[derive(Clone)]
pub struct FunctionValue {
    pub parameters: Vec<String>,
    pub body: Rc<Scope>,
    pub env: EnvRef,
}

/// Immutable singly linked list. Tails are shared between values, so
/// building a longer list from an existing one never copies the old cells.
#[derive(Clone, Default)]
pub struct ListValue {
    head: Option<Rc<ListNode>>,
    size: u64,
}

struct ListNode {
    value: Value,
    next: Option<Rc<ListNode>>,
}

impl ListValue {
    pub fn from_values(values: Vec<Value>) -> Self {
        let size = values.len() as u64;
        let mut head = None;
        for value in values.into_iter().rev() {
            head = Some(Rc::new(ListNode { value, next: head }));
        }
        Self { head, size }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn get(&self, index: u64) -> Option<&Value> {
        self.iter().nth(index as usize)
    }

    pub fn iter(&self) -> ListIter<'_> {
        ListIter {
            node: self.head.as_deref(),
        }
    }
}

pub struct ListIter<'a> {
    node: Option<&'a ListNode>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        let node = self.node?;
        self.node = node.next.as_deref();
        Some(&node.value)
    }
}

impl Value {
    /// Renders the value the way the REPL prints results.
    pub fn inspect(&self) -> String {
        match self {
            Value::Unit => "()".to_string(),
            Value::Boolean(value) => value.to_string(),
            Value::Integer(value) => value.to_string(),
            Value::Float(value) => format_float(*value),
            Value::String(value) => format!("\"{}\"", escape_string(value)),
            Value::Keyword(name) => name.clone(),
            Value::Array { size, elements } => {
                let elements: Vec<String> = elements.iter().map(Value::inspect).collect();
                format!("[{size}: {}]", elements.join(" "))
            }
            Value::List(list) => {
                let elements: Vec<String> = list.iter().map(Value::inspect).collect();
                format!("[{}]", elements.join(" "))
            }
            Value::Record(fields) => {
                if fields.is_empty() {
                    return "{}".to_string();
                }
                let mut names: Vec<&String> = fields.keys().collect();
                names.sort();
                let fields: Vec<String> = names
                    .into_iter()
                    .map(|name| format!("{name}: {}", fields[name].inspect()))
                    .collect();
                format!("{{ {} }}", fields.join(" "))
            }
            Value::Function(function) => {
                format!("\\{} {{ {} }}", function.parameters.join(" "), function.body)
            }
            Value::Builtin(_) => "builtin function".to_string(),
        }
    }

    /// Short noun used in type error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::Array { .. } => "array",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin function",
        }
    }
}

/// Shortest-ish float rendering: plain decimal in the comfortable range,
/// exponent notation for very small or very large magnitudes.
fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && (magnitude < 1e-4 || magnitude >= 1e15) {
        format!("{value:e}")
    } else {
        let rendered = format!("{value}");
        if rendered.contains('.') || rendered.contains('e') || rendered.contains("inf") {
            rendered
        } else {
            format!("{rendered}.0")
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Function(function) => {
                write!(f, "Function(\\{})", function.parameters.join(" "))
            }
            Value::Builtin(_) => write!(f, "Builtin"),
            other => write!(f, "{}", other.inspect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_preserves_order_and_size() {
        let list =
            ListValue::from_values(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(list.size(), 3);
        let inspected: Vec<String> = list.iter().map(Value::inspect).collect();
        assert_eq!(inspected, vec!["1", "2", "3"]);
        assert_eq!(list.get(2).map(Value::inspect), Some("3".to_string()));
        assert!(list.get(3).is_none());
    }

    #[test]
    fn inspect_collections() {
        let array = Value::Array {
            size: 2,
            elements: vec![Value::Integer(1), Value::Integer(2)],
        };
        assert_eq!(array.inspect(), "[2: 1 2]");

        let list = Value::List(ListValue::from_values(vec![
            Value::String("a".to_string()),
            Value::Boolean(true),
        ]));
        assert_eq!(list.inspect(), "[\"a\" true]");

        let mut fields = HashMap::new();
        fields.insert("name".to_string(), Value::String("ada".to_string()));
        fields.insert("age".to_string(), Value::Integer(36));
        assert_eq!(Value::Record(fields).inspect(), "{ age: 36 name: \"ada\" }");
    }

    #[test]
    fn inspect_floats() {
        assert_eq!(Value::Float(3.25).inspect(), "3.25");
        assert_eq!(Value::Float(2.0).inspect(), "2.0");
        assert_eq!(Value::Float(0.0).inspect(), "0.0");
        assert_eq!(Value::Float(1e-7).inspect(), "1e-7");
    }
}
