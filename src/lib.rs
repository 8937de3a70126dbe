//! Raiton — a small functional language: lexer, parser, pretty-printing AST
//! and a tree-walking evaluator.

pub mod ast;
pub mod builtin;
pub mod comparator;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use ast::{Expression, Scope};
pub use builtin::BuiltinRegistry;
pub use environment::{EnvRef, Environment};
pub use evaluator::Evaluator;
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use token::{Token, TokenKind};
pub use value::{EvalError, EvalResult, Value};

/// Parses a whole source text into its file-level scope.
pub fn parse(source: &str) -> Result<Scope, ParseError> {
    Parser::new(Lexer::new(source)).parse()
}
