//! Recursive descent parser: token stream → AST.
//!
//! The parser holds the current token and a one-token peek buffer; the buffer
//! is filled lazily from the lexer and drained by the next advance. Peeking is
//! what disambiguates the forms that share a leading token: `x: 1` versus
//! `x.y` versus bare `x`, and `[3: ...]` versus `[a b c]`.

use std::fmt;
use std::rc::Rc;

use crate::ast::{
    Application, Array, Conditional, Definition, Expression, Function, List, Record, Scope,
    Selector, SelectorItem,
};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

#[derive(Debug)]
pub enum ParseError {
    /// A specific token kind was required and something else was found.
    Expected {
        expected: TokenKind,
        got: TokenKind,
        line: u32,
        column: u32,
    },
    /// No production starts with the token that was found.
    Unexpected {
        got: TokenKind,
        literal: String,
        line: u32,
        column: u32,
    },
    /// A numeric literal did not fit its type.
    Number {
        literal: String,
        line: u32,
        column: u32,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Expected {
                expected,
                got,
                line,
                column,
            } => write!(
                f,
                "expected {expected}, but got {got} on line {line} column {column}"
            ),
            ParseError::Unexpected {
                got,
                literal,
                line,
                column,
            } => {
                if literal.is_empty() {
                    write!(f, "unexpected {got} on line {line} column {column}")
                } else {
                    write!(
                        f,
                        "unexpected {got} `{literal}` on line {line} column {column}"
                    )
                }
            }
            ParseError::Number {
                literal,
                line,
                column,
            } => write!(
                f,
                "malformed number `{literal}` on line {line} column {column}"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub struct Parser {
    lexer: Lexer,
    token: Token,
    peeked: Option<Token>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let token = lexer.next();
        Self {
            lexer,
            token,
            peeked: None,
        }
    }

    /// Parses the whole source as one file-level scope.
    pub fn parse(mut self) -> Result<Scope, ParseError> {
        let mut scope = Scope::default();
        while !self.matches(TokenKind::Eof) {
            self.scope_item(&mut scope)?;
        }
        Ok(scope)
    }

    fn advance(&mut self) {
        self.token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next(),
        };
    }

    fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next());
        }
        match &self.peeked {
            Some(token) => token,
            None => &self.token,
        }
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    fn expect(&self, expected: TokenKind) -> Result<(), ParseError> {
        if self.matches(expected) {
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                got: self.token.kind,
                line: self.token.line,
                column: self.token.column,
            })
        }
    }

    fn consume(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        self.expect(expected)?;
        self.advance();
        Ok(())
    }

    fn unexpected(&self) -> ParseError {
        ParseError::Unexpected {
            got: self.token.kind,
            literal: self.token.literal.clone(),
            line: self.token.line,
            column: self.token.column,
        }
    }

    fn scope(&mut self) -> Result<Scope, ParseError> {
        self.consume(TokenKind::OpenBrace)?;
        let mut scope = Scope::default();
        while !self.matches(TokenKind::ClosedBrace) && !self.matches(TokenKind::Eof) {
            self.scope_item(&mut scope)?;
        }
        self.consume(TokenKind::ClosedBrace)?;
        Ok(scope)
    }

    fn scope_item(&mut self, scope: &mut Scope) -> Result<(), ParseError> {
        match self.token.kind {
            // A leading identifier may open a definition or stand alone; only
            // the token after it tells which.
            TokenKind::Identifier => match self.peek().kind {
                TokenKind::Colon | TokenKind::OpenBrace => {
                    let definition = self.definition()?;
                    scope.definitions.push(definition);
                }
                _ => {
                    let expression = self.expression()?;
                    scope.expressions.push(expression);
                }
            },
            TokenKind::Function => {
                let definition = self.function_definition()?;
                scope.definitions.push(definition);
            }
            _ => {
                let expression = self.expression()?;
                scope.expressions.push(expression);
            }
        }
        Ok(())
    }

    fn definition(&mut self) -> Result<Definition, ParseError> {
        let identifier = self.token.literal.clone();
        self.consume(TokenKind::Identifier)?;

        let expression = if self.matches(TokenKind::Colon) {
            self.advance();
            self.expression()?
        } else {
            Expression::Scope(self.scope()?)
        };

        Ok(Definition {
            identifier,
            expression,
        })
    }

    /// `fn name p1 p2 { body }` is sugar for binding a function literal.
    fn function_definition(&mut self) -> Result<Definition, ParseError> {
        self.consume(TokenKind::Function)?;
        self.expect(TokenKind::Identifier)?;
        let identifier = self.token.literal.clone();
        self.advance();

        let mut parameters = Vec::new();
        while self.matches(TokenKind::Identifier) {
            parameters.push(self.token.literal.clone());
            self.advance();
        }

        let body = self.scope_or_single_expression()?;

        Ok(Definition {
            identifier,
            expression: Expression::Function(Function {
                parameters,
                body: Rc::new(body),
            }),
        })
    }

    /// Either a braced scope or `: expr`, which wraps the expression in a
    /// one-item scope. Function bodies and conditional branches share this.
    fn scope_or_single_expression(&mut self) -> Result<Scope, ParseError> {
        if self.matches(TokenKind::Colon) {
            self.advance();
            let expression = self.expression()?;
            Ok(Scope {
                definitions: Vec::new(),
                expressions: vec![expression],
            })
        } else {
            self.scope()
        }
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        match self.token.kind {
            TokenKind::Identifier => self.selector(),
            TokenKind::Number | TokenKind::Minus => self.number(),
            TokenKind::Boolean => {
                let literal = self.token.literal.clone();
                self.advance();
                Ok(Expression::Boolean(literal))
            }
            TokenKind::TypeKeyword => {
                let literal = self.token.literal.clone();
                self.advance();
                Ok(Expression::Keyword(literal))
            }
            TokenKind::DoubleQuote => self.string(TokenKind::DoubleQuote),
            TokenKind::SingleQuote => self.string(TokenKind::SingleQuote),
            TokenKind::OpenBracket => self.array_or_list(),
            TokenKind::OpenBrace => Ok(Expression::Record(self.record()?)),
            TokenKind::Backslash => self.function_literal(),
            TokenKind::OpenParen => self.application(),
            TokenKind::If => self.conditional(),
            _ => Err(self.unexpected()),
        }
    }

    fn selector(&mut self) -> Result<Expression, ParseError> {
        let first = self.token.literal.clone();
        self.consume(TokenKind::Identifier)?;

        let mut items = vec![SelectorItem::Field(first)];
        while self.matches(TokenKind::Dot) {
            self.advance();
            match self.token.kind {
                TokenKind::Identifier => {
                    items.push(SelectorItem::Field(self.token.literal.clone()));
                    self.advance();
                }
                TokenKind::Number => {
                    let index = self.unsigned(&self.token.literal)?;
                    items.push(SelectorItem::Index(index));
                    self.advance();
                }
                _ => return Err(self.unexpected()),
            }
        }

        if items.len() == 1 {
            match items.remove(0) {
                SelectorItem::Field(name) => Ok(Expression::Identifier(name)),
                SelectorItem::Index(_) => Err(self.unexpected()),
            }
        } else {
            Ok(Expression::Selector(Selector { items }))
        }
    }

    fn number(&mut self) -> Result<Expression, ParseError> {
        let negative = self.matches(TokenKind::Minus);
        if negative {
            self.advance();
        }

        self.expect(TokenKind::Number)?;
        let mut literal = self.token.literal.clone();
        if negative {
            literal.insert(0, '-');
        }
        let (line, column) = (self.token.line, self.token.column);
        self.advance();

        // A dot right after a number literal can only continue it into a
        // float; selector indices never route through here.
        if self.matches(TokenKind::Dot) {
            self.advance();
            self.expect(TokenKind::Number)?;
            literal.push('.');
            literal.push_str(&self.token.literal);
            self.advance();
            let value = literal
                .parse::<f64>()
                .map_err(|_| ParseError::Number {
                    literal: literal.clone(),
                    line,
                    column,
                })?;
            Ok(Expression::Float(value))
        } else {
            let value = literal
                .parse::<i64>()
                .map_err(|_| ParseError::Number {
                    literal: literal.clone(),
                    line,
                    column,
                })?;
            Ok(Expression::Integer(value))
        }
    }

    fn unsigned(&self, literal: &str) -> Result<u64, ParseError> {
        literal.parse::<u64>().map_err(|_| ParseError::Number {
            literal: literal.to_string(),
            line: self.token.line,
            column: self.token.column,
        })
    }

    fn string(&mut self, quote: TokenKind) -> Result<Expression, ParseError> {
        self.consume(quote)?;
        // Empty strings lex as two adjacent quote tokens with no body between.
        let body = if self.matches(TokenKind::String) {
            let body = self.token.literal.clone();
            self.advance();
            body
        } else {
            String::new()
        };
        self.consume(quote)?;
        Ok(Expression::String(body))
    }

    fn array_or_list(&mut self) -> Result<Expression, ParseError> {
        self.consume(TokenKind::OpenBracket)?;

        if self.matches(TokenKind::Colon) {
            self.advance();
            let elements = self.bracket_elements()?;
            return Ok(Expression::Array(Array {
                size: elements.len() as u64,
                elements,
            }));
        }

        if self.matches(TokenKind::Number) && self.peek().kind == TokenKind::Colon {
            let size = self.unsigned(&self.token.literal)?;
            self.advance();
            self.consume(TokenKind::Colon)?;
            let elements = self.bracket_elements()?;
            return Ok(Expression::Array(Array { size, elements }));
        }

        let elements = self.bracket_elements()?;
        Ok(Expression::List(List { elements }))
    }

    fn bracket_elements(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut elements = Vec::new();
        while !self.matches(TokenKind::ClosedBracket) && !self.matches(TokenKind::Eof) {
            elements.push(self.expression()?);
        }
        self.consume(TokenKind::ClosedBracket)?;
        Ok(elements)
    }

    fn record(&mut self) -> Result<Record, ParseError> {
        self.consume(TokenKind::OpenBrace)?;
        let mut record = Record::default();
        while self.matches(TokenKind::Identifier) {
            let field = self.token.literal.clone();
            self.advance();
            self.consume(TokenKind::Colon)?;
            let expression = self.expression()?;
            // A repeated field keeps its last expression.
            record.fields.insert(field, expression);
        }
        self.consume(TokenKind::ClosedBrace)?;
        Ok(record)
    }

    fn function_literal(&mut self) -> Result<Expression, ParseError> {
        self.consume(TokenKind::Backslash)?;

        let mut parameters = Vec::new();
        while self.matches(TokenKind::Identifier) {
            parameters.push(self.token.literal.clone());
            self.advance();
        }

        let body = self.scope_or_single_expression()?;

        Ok(Expression::Function(Function {
            parameters,
            body: Rc::new(body),
        }))
    }

    fn application(&mut self) -> Result<Expression, ParseError> {
        self.consume(TokenKind::OpenParen)?;
        let mut arguments = Vec::new();
        while !self.matches(TokenKind::ClosedParen) && !self.matches(TokenKind::Eof) {
            arguments.push(self.expression()?);
        }
        self.consume(TokenKind::ClosedParen)?;
        Ok(Expression::Application(Application { arguments }))
    }

    fn conditional(&mut self) -> Result<Expression, ParseError> {
        self.consume(TokenKind::If)?;
        let condition = Box::new(self.expression()?);
        let consequence = self.scope_or_single_expression()?;
        self.consume(TokenKind::Else)?;
        let alternative = self.scope_or_single_expression()?;
        Ok(Expression::Conditional(Conditional {
            condition,
            consequence,
            alternative,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::comparator::compare_scopes;

    fn parse(source: &str) -> Scope {
        match Parser::new(Lexer::new(source)).parse() {
            Ok(scope) => scope,
            Err(error) => panic!("parse failed: {error}"),
        }
    }

    fn assert_parses(source: &str, expected: Scope) {
        let got = parse(source);
        if let Err(mismatch) = compare_scopes(&got, &expected) {
            panic!("{mismatch}");
        }
    }

    fn single(expression: Expression) -> Scope {
        Scope {
            definitions: Vec::new(),
            expressions: vec![expression],
        }
    }

    #[test]
    fn definition_with_colon() {
        assert_parses(
            "answer: 42",
            Scope {
                definitions: vec![Definition {
                    identifier: "answer".to_string(),
                    expression: Expression::Integer(42),
                }],
                expressions: Vec::new(),
            },
        );
    }

    #[test]
    fn definition_with_scope_body() {
        assert_parses(
            "pair { a: 1 b: 2 a }",
            Scope {
                definitions: vec![Definition {
                    identifier: "pair".to_string(),
                    expression: Expression::Scope(Scope {
                        definitions: vec![
                            Definition {
                                identifier: "a".to_string(),
                                expression: Expression::Integer(1),
                            },
                            Definition {
                                identifier: "b".to_string(),
                                expression: Expression::Integer(2),
                            },
                        ],
                        expressions: vec![Expression::Identifier("a".to_string())],
                    }),
                }],
                expressions: Vec::new(),
            },
        );
    }

    #[test]
    fn function_definition_desugars_to_literal() {
        assert_parses(
            "fn add_two x: (add x 2)",
            Scope {
                definitions: vec![Definition {
                    identifier: "add_two".to_string(),
                    expression: Expression::Function(Function {
                        parameters: vec!["x".to_string()],
                        body: Rc::new(single(Expression::Application(Application {
                            arguments: vec![
                                Expression::Identifier("add".to_string()),
                                Expression::Identifier("x".to_string()),
                                Expression::Integer(2),
                            ],
                        }))),
                    }),
                }],
                expressions: Vec::new(),
            },
        );
    }

    #[test]
    fn function_literal_with_braced_body() {
        assert_parses(
            "\\x y { (add x y) }",
            single(Expression::Function(Function {
                parameters: vec!["x".to_string(), "y".to_string()],
                body: Rc::new(single(Expression::Application(Application {
                    arguments: vec![
                        Expression::Identifier("add".to_string()),
                        Expression::Identifier("x".to_string()),
                        Expression::Identifier("y".to_string()),
                    ],
                }))),
            })),
        );
    }

    #[test]
    fn sized_array_versus_list() {
        assert_parses(
            "[3: 1 2 3]",
            single(Expression::Array(Array {
                size: 3,
                elements: vec![
                    Expression::Integer(1),
                    Expression::Integer(2),
                    Expression::Integer(3),
                ],
            })),
        );
        assert_parses(
            "[1 2 3]",
            single(Expression::List(List {
                elements: vec![
                    Expression::Integer(1),
                    Expression::Integer(2),
                    Expression::Integer(3),
                ],
            })),
        );
    }

    #[test]
    fn implicit_array_size_counts_elements() {
        assert_parses(
            "[: 7 8]",
            single(Expression::Array(Array {
                size: 2,
                elements: vec![Expression::Integer(7), Expression::Integer(8)],
            })),
        );
    }

    #[test]
    fn selector_mixes_fields_and_indices() {
        assert_parses(
            "state.users.0.name",
            single(Expression::Selector(Selector {
                items: vec![
                    SelectorItem::Field("state".to_string()),
                    SelectorItem::Field("users".to_string()),
                    SelectorItem::Index(0),
                    SelectorItem::Field("name".to_string()),
                ],
            })),
        );
    }

    #[test]
    fn negative_and_float_numbers() {
        assert_parses(
            "[-5 3.25 -0.5]",
            single(Expression::List(List {
                elements: vec![
                    Expression::Integer(-5),
                    Expression::Float(3.25),
                    Expression::Float(-0.5),
                ],
            })),
        );
    }

    #[test]
    fn record_with_nested_expression() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), Expression::String("ada".to_string()));
        fields.insert(
            "tags".to_string(),
            Expression::List(List {
                elements: vec![Expression::String("admin".to_string())],
            }),
        );
        assert_parses(
            "{ name: \"ada\" tags: [\"admin\"] }",
            single(Expression::Record(Record { fields })),
        );
    }

    #[test]
    fn empty_string_between_quotes() {
        assert_parses("\"\"", single(Expression::String(String::new())));
        assert_parses("''", single(Expression::String(String::new())));
    }

    #[test]
    fn conditional_with_expression_branches() {
        assert_parses(
            "if (eq 1 1): 10 else: 20",
            single(Expression::Conditional(Conditional {
                condition: Box::new(Expression::Application(Application {
                    arguments: vec![
                        Expression::Identifier("eq".to_string()),
                        Expression::Integer(1),
                        Expression::Integer(1),
                    ],
                })),
                consequence: single(Expression::Integer(10)),
                alternative: single(Expression::Integer(20)),
            })),
        );
    }

    #[test]
    fn unterminated_string_reports_expected_quote() {
        let error = Parser::new(Lexer::new("\"oops")).parse().unwrap_err();
        let message = error.to_string();
        assert!(
            message.starts_with("expected double_quote, but got eof"),
            "unexpected message: {message}"
        );
    }

    #[test]
    fn stray_closing_paren_is_rejected() {
        let error = Parser::new(Lexer::new("a: )")).parse().unwrap_err();
        assert!(matches!(error, ParseError::Unexpected { .. }));
    }
}
