//! Structural AST comparison for tests.
//!
//! Derived `PartialEq` answers *whether* two trees differ; this module says
//! *where*, carrying a dotted node path in the mismatch so a failing parser
//! test points at the diverging node.

use std::fmt;

use crate::ast::{Expression, Scope, SelectorItem};

#[derive(Debug)]
pub struct Mismatch {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mismatch at {}: {}", self.path, self.message)
    }
}

impl std::error::Error for Mismatch {}

fn mismatch(path: &str, message: impl Into<String>) -> Result<(), Mismatch> {
    Err(Mismatch {
        path: path.to_string(),
        message: message.into(),
    })
}

pub fn compare_scopes(got: &Scope, expected: &Scope) -> Result<(), Mismatch> {
    scopes(got, expected, "scope")
}

pub fn compare(got: &Expression, expected: &Expression) -> Result<(), Mismatch> {
    expressions(got, expected, "expression")
}

fn scopes(got: &Scope, expected: &Scope, path: &str) -> Result<(), Mismatch> {
    if got.definitions.len() != expected.definitions.len() {
        return mismatch(
            path,
            format!(
                "expected {} definitions, got {}",
                expected.definitions.len(),
                got.definitions.len()
            ),
        );
    }
    if got.expressions.len() != expected.expressions.len() {
        return mismatch(
            path,
            format!(
                "expected {} expressions, got {}",
                expected.expressions.len(),
                got.expressions.len()
            ),
        );
    }

    for (i, (g, e)) in got
        .definitions
        .iter()
        .zip(expected.definitions.iter())
        .enumerate()
    {
        let path = format!("{path}.definitions[{i}]");
        if g.identifier != e.identifier {
            return mismatch(
                &path,
                format!(
                    "expected identifier `{}`, got `{}`",
                    e.identifier, g.identifier
                ),
            );
        }
        expressions(&g.expression, &e.expression, &format!("{path}.expression"))?;
    }

    for (i, (g, e)) in got
        .expressions
        .iter()
        .zip(expected.expressions.iter())
        .enumerate()
    {
        expressions(g, e, &format!("{path}.expressions[{i}]"))?;
    }

    Ok(())
}

fn expressions(got: &Expression, expected: &Expression, path: &str) -> Result<(), Mismatch> {
    use Expression::*;

    match (got, expected) {
        (Scope(g), Scope(e)) => scopes(g, e, path),
        (Identifier(g), Identifier(e)) => {
            if g != e {
                return mismatch(path, format!("expected identifier `{e}`, got `{g}`"));
            }
            Ok(())
        }
        (Selector(g), Selector(e)) => {
            if g.items.len() != e.items.len() {
                return mismatch(
                    path,
                    format!(
                        "expected selector of {} items, got {}",
                        e.items.len(),
                        g.items.len()
                    ),
                );
            }
            for (i, (gi, ei)) in g.items.iter().zip(e.items.iter()).enumerate() {
                let path = format!("{path}.items[{i}]");
                match (gi, ei) {
                    (SelectorItem::Field(g), SelectorItem::Field(e)) if g == e => {}
                    (SelectorItem::Index(g), SelectorItem::Index(e)) if g == e => {}
                    (g, e) => {
                        return mismatch(&path, format!("expected {e:?}, got {g:?}"));
                    }
                }
            }
            Ok(())
        }
        (Application(g), Application(e)) => {
            if g.arguments.len() != e.arguments.len() {
                return mismatch(
                    path,
                    format!(
                        "expected {} arguments, got {}",
                        e.arguments.len(),
                        g.arguments.len()
                    ),
                );
            }
            for (i, (ga, ea)) in g.arguments.iter().zip(e.arguments.iter()).enumerate() {
                expressions(ga, ea, &format!("{path}.arguments[{i}]"))?;
            }
            Ok(())
        }
        (Function(g), Function(e)) => {
            if g.parameters != e.parameters {
                return mismatch(
                    path,
                    format!(
                        "expected parameters {:?}, got {:?}",
                        e.parameters, g.parameters
                    ),
                );
            }
            scopes(&g.body, &e.body, &format!("{path}.body"))
        }
        (Conditional(g), Conditional(e)) => {
            expressions(&g.condition, &e.condition, &format!("{path}.condition"))?;
            scopes(&g.consequence, &e.consequence, &format!("{path}.consequence"))?;
            scopes(&g.alternative, &e.alternative, &format!("{path}.alternative"))
        }
        (Record(g), Record(e)) => {
            if g.fields.len() != e.fields.len() {
                return mismatch(
                    path,
                    format!("expected {} fields, got {}", e.fields.len(), g.fields.len()),
                );
            }
            for (field, ee) in &e.fields {
                let path = format!("{path}.{field}");
                match g.fields.get(field) {
                    Some(ge) => expressions(ge, ee, &path)?,
                    None => return mismatch(&path, format!("missing field `{field}`")),
                }
            }
            Ok(())
        }
        (Array(g), Array(e)) => {
            if g.size != e.size {
                return mismatch(path, format!("expected size {}, got {}", e.size, g.size));
            }
            if g.elements.len() != e.elements.len() {
                return mismatch(
                    path,
                    format!(
                        "expected {} elements, got {}",
                        e.elements.len(),
                        g.elements.len()
                    ),
                );
            }
            for (i, (ge, ee)) in g.elements.iter().zip(e.elements.iter()).enumerate() {
                expressions(ge, ee, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        (List(g), List(e)) => {
            if g.elements.len() != e.elements.len() {
                return mismatch(
                    path,
                    format!(
                        "expected {} elements, got {}",
                        e.elements.len(),
                        g.elements.len()
                    ),
                );
            }
            for (i, (ge, ee)) in g.elements.iter().zip(e.elements.iter()).enumerate() {
                expressions(ge, ee, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        (Integer(g), Integer(e)) => {
            if g != e {
                return mismatch(path, format!("expected {e}, got {g}"));
            }
            Ok(())
        }
        (Float(g), Float(e)) => {
            if g != e {
                return mismatch(path, format!("expected {e}, got {g}"));
            }
            Ok(())
        }
        (String(g), String(e)) => {
            if g != e {
                return mismatch(path, format!("expected `{e}`, got `{g}`"));
            }
            Ok(())
        }
        (Boolean(g), Boolean(e)) => {
            if g != e {
                return mismatch(path, format!("expected `{e}`, got `{g}`"));
            }
            Ok(())
        }
        (Keyword(g), Keyword(e)) => {
            if g != e {
                return mismatch(path, format!("expected `{e}`, got `{g}`"));
            }
            Ok(())
        }
        (g, e) => mismatch(path, format!("expected {}, got {}", variant(e), variant(g))),
    }
}

fn variant(expression: &Expression) -> &'static str {
    match expression {
        Expression::Scope(_) => "scope",
        Expression::Identifier(_) => "identifier",
        Expression::Selector(_) => "selector",
        Expression::Application(_) => "application",
        Expression::Function(_) => "function",
        Expression::Conditional(_) => "conditional",
        Expression::Record(_) => "record",
        Expression::Array(_) => "array",
        Expression::List(_) => "list",
        Expression::Integer(_) => "integer",
        Expression::Float(_) => "float",
        Expression::String(_) => "string",
        Expression::Boolean(_) => "boolean",
        Expression::Keyword(_) => "keyword",
    }
}
