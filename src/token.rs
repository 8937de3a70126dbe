//! Tokens produced by the lexer.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    String,
    Number,
    Boolean,
    Function,
    If,
    Else,
    TypeKeyword,

    OpenParen,
    ClosedParen,
    OpenBracket,
    ClosedBracket,
    OpenBrace,
    ClosedBrace,

    SingleQuote,
    DoubleQuote,
    Colon,
    Backslash,
    Minus,
    Dot,
    Arrow,

    Eof,
    Illegal,
}

impl TokenKind {
    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Function => "function",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::TypeKeyword => "type",
            TokenKind::OpenParen => "open_paren",
            TokenKind::ClosedParen => "closed_paren",
            TokenKind::OpenBracket => "open_bracket",
            TokenKind::ClosedBracket => "closed_bracket",
            TokenKind::OpenBrace => "open_brace",
            TokenKind::ClosedBrace => "closed_brace",
            TokenKind::SingleQuote => "single_quote",
            TokenKind::DoubleQuote => "double_quote",
            TokenKind::Colon => "colon",
            TokenKind::Backslash => "backslash",
            TokenKind::Minus => "minus",
            TokenKind::Dot => "dot",
            TokenKind::Arrow => "arrow",
            TokenKind::Eof => "eof",
            TokenKind::Illegal => "illegal",
        };
        f.pad(name)
    }
}

/// Maps a reserved word to its token kind. `true` and `false` share the
/// boolean kind; the literal keeps them apart.
pub fn keyword_kind(literal: &str) -> Option<TokenKind> {
    match literal {
        "true" | "false" => Some(TokenKind::Boolean),
        "fn" => Some(TokenKind::Function),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "type" => Some(TokenKind::TypeKeyword),
        _ => None,
    }
}

/// Maps a one- or two-character lexeme to its symbol kind. The lexer tries
/// the two-character form first.
pub fn symbol_kind(lexeme: &str) -> Option<TokenKind> {
    match lexeme {
        "(" => Some(TokenKind::OpenParen),
        ")" => Some(TokenKind::ClosedParen),
        "[" => Some(TokenKind::OpenBracket),
        "]" => Some(TokenKind::ClosedBracket),
        "{" => Some(TokenKind::OpenBrace),
        "}" => Some(TokenKind::ClosedBrace),
        "'" => Some(TokenKind::SingleQuote),
        "\"" => Some(TokenKind::DoubleQuote),
        ":" => Some(TokenKind::Colon),
        "\\" => Some(TokenKind::Backslash),
        "-" => Some(TokenKind::Minus),
        "." => Some(TokenKind::Dot),
        "->" => Some(TokenKind::Arrow),
        _ => None,
    }
}

/// A single lexeme with its kind and the 1-based position of its first
/// character.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    /// One row per token, as printed by the `tokenize` command.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::String {
            write!(
                f,
                "({:3}, {:3}) {:>13} `{}`",
                self.line, self.column, self.kind, self.literal
            )
        } else {
            write!(
                f,
                "({:3}, {:3}) {:>13} {}",
                self.line, self.column, self.kind, self.literal
            )
        }
    }
}
