//! AST: the typed node family produced by the parser.
//!
//! Nodes are immutable after parsing. A function body is held behind `Rc`
//! because closures share it with the tree. The `Display` impls render a
//! node back to source form; the output is re-parseable, which the test
//! suite relies on.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Scope(Scope),
    Identifier(String),
    Selector(Selector),
    Application(Application),
    Function(Function),
    Conditional(Conditional),
    Record(Record),
    Array(Array),
    List(List),
    Integer(i64),
    Float(f64),
    String(String),
    /// Source-literal carrier; the evaluator parses it to a runtime boolean.
    Boolean(String),
    /// An atom, e.g. the bare `type` keyword.
    Keyword(String),
}

/// Zero or more definitions followed by zero or more expressions. The value
/// of a scope is the value of its last expression.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    pub definitions: Vec<Definition>,
    pub expressions: Vec<Expression>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `name: expr` or `name { scope }`; `fn name params { body }` desugars to
/// a definition whose expression is a function literal.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub identifier: String,
    pub expression: Expression,
}

/// A dotted access path. The first item is always a field (the head
/// identifier); later items may be record fields or sequence indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    pub items: Vec<SelectorItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectorItem {
    Field(String),
    Index(u64),
}

/// `(callee arg …)`. Empty applications evaluate to unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Application {
    pub arguments: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Rc<Scope>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Conditional {
    pub condition: Box<Expression>,
    pub consequence: Scope,
    pub alternative: Scope,
}

/// Later duplicate keys overwrite earlier ones; field order is not
/// significant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub fields: HashMap<String, Expression>,
}

/// Fixed-size sequence; `size` must equal the element count at evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    pub size: u64,
    pub elements: Vec<Expression>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    pub elements: Vec<Expression>,
}

/// Escapes a string body so the lexer reads it back verbatim. A lone
/// backslash needs no escaping in this dialect: `\` before an ordinary
/// character passes through unchanged.
pub(crate) fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for definition in &self.definitions {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{definition}")?;
        }
        for expression in &self.expressions {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{expression}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Expression::Scope(scope) => write!(f, "{} {{ {} }}", self.identifier, scope),
            other => write!(f, "{}: {}", self.identifier, other),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match item {
                SelectorItem::Field(name) => f.write_str(name)?,
                SelectorItem::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\\")?;
        for parameter in &self.parameters {
            write!(f, "{parameter} ")?;
        }
        write!(f, "{{ {} }}", self.body)
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "if {} {{ {} }} else {{ {} }}",
            self.condition, self.consequence, self.alternative
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<(&String, &Expression)> = self.fields.iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        f.write_str("{ ")?;
        for (field, expression) in fields {
            write!(f, "{field}: {expression} ")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:", self.size)?;
        for element in &self.elements {
            write!(f, " {element}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{element}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Scope(scope) => write!(f, "{{ {scope} }}"),
            Expression::Identifier(name) => f.write_str(name),
            Expression::Selector(selector) => write!(f, "{selector}"),
            Expression::Application(application) => write!(f, "{application}"),
            Expression::Function(function) => write!(f, "{function}"),
            Expression::Conditional(conditional) => write!(f, "{conditional}"),
            Expression::Record(record) => write!(f, "{record}"),
            Expression::Array(array) => write!(f, "{array}"),
            Expression::List(list) => write!(f, "{list}"),
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Float(value) => {
                let rendered = value.to_string();
                if rendered.contains('.') {
                    f.write_str(&rendered)
                } else {
                    // keep the dot so the literal reads back as a float
                    write!(f, "{rendered}.0")
                }
            }
            Expression::String(value) => write!(f, "\"{}\"", escape_string(value)),
            Expression::Boolean(literal) => f.write_str(literal),
            Expression::Keyword(literal) => f.write_str(literal),
        }
    }
}
