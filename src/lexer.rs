//! Lexer: source text to token stream.
//!
//! The scanner works byte by byte and never fails; malformed input surfaces
//! as `illegal` tokens, and running past the end of the source yields an
//! endless suffix of `eof` tokens. String bodies are scanned in a dedicated
//! mode so that quote tokens, string contents and the closing quote come out
//! as separate tokens.

use crate::token::{keyword_kind, symbol_kind, Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Inside a string body; `terminator` holds the quote that opened it.
    Sequence,
}

pub struct Lexer {
    source: Vec<u8>,
    position: usize,
    line: u32,
    column: u32,
    mode: Mode,
    terminator: u8,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.as_bytes().to_vec(),
            position: 0,
            line: 1,
            column: 1,
            mode: Mode::Normal,
            terminator: 0,
        }
    }

    /// Produces the next token. Safe to call forever; returns `eof` tokens
    /// once the source is exhausted.
    pub fn next(&mut self) -> Token {
        match self.mode {
            Mode::Normal => self.normal_mode(),
            Mode::Sequence => self.sequence_mode(),
        }
    }

    fn normal_mode(&mut self) -> Token {
        self.skip_whitespace();

        let Some(byte) = self.peek() else {
            return self.eof_token();
        };

        if byte.is_ascii_alphabetic() || byte == b'_' {
            self.identifier_token()
        } else if byte.is_ascii_digit() {
            self.number_token()
        } else if byte == b'"' || byte == b'\'' {
            let token = self.special_token();
            self.mode = Mode::Sequence;
            self.terminator = byte;
            token
        } else {
            self.special_token()
        }
    }

    fn sequence_mode(&mut self) -> Token {
        match self.peek() {
            None => self.eof_token(),
            Some(byte) if byte == self.terminator => {
                let token = self.special_token();
                self.mode = Mode::Normal;
                token
            }
            Some(_) => self.string_token(),
        }
    }

    /// `(_|letter)(_|letter|digit)*` with an optional trailing `!`. Reserved
    /// words come out with their keyword kind.
    fn identifier_token(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut literal = String::new();

        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'_' {
                literal.push(byte as char);
                self.bump();
            } else {
                break;
            }
        }

        if self.peek() == Some(b'!') {
            literal.push('!');
            self.bump();
        }

        let kind = keyword_kind(&literal).unwrap_or(TokenKind::Identifier);
        Token::new(kind, literal, line, column)
    }

    /// An unsigned run of digits. `-` and `.` are separate tokens; the
    /// parser assembles signed and fractional numbers from them.
    fn number_token(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut literal = String::new();

        while let Some(byte) = self.peek() {
            if byte.is_ascii_digit() {
                literal.push(byte as char);
                self.bump();
            } else {
                break;
            }
        }

        Token::new(TokenKind::Number, literal, line, column)
    }

    /// String body up to (not including) the terminator quote. Reaching the
    /// end of input mid-escape yields `eof`; reaching it mid-string yields
    /// the partial string, and the following call yields `eof`.
    fn string_token(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut bytes: Vec<u8> = Vec::new();

        while let Some(byte) = self.peek() {
            if byte == self.terminator {
                break;
            }
            self.bump();

            if byte == b'\\' {
                let Some(escaped) = self.bump() else {
                    return self.eof_token();
                };
                match escaped {
                    b'"' => bytes.push(b'"'),
                    b'\'' => bytes.push(b'\''),
                    b'n' => bytes.push(b'\n'),
                    b't' => bytes.push(b'\t'),
                    other => {
                        bytes.push(b'\\');
                        bytes.push(other);
                    }
                }
            } else {
                bytes.push(byte);
            }
        }

        let literal = String::from_utf8_lossy(&bytes).into_owned();
        Token::new(TokenKind::String, literal, line, column)
    }

    /// Symbol dispatch with a greedy two-character lookahead, so that `->`
    /// wins over `-` followed by `>`.
    fn special_token(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let first = match self.bump() {
            Some(byte) => byte as char,
            None => return self.eof_token(),
        };

        if let Some(second) = self.peek() {
            let mut extended = String::with_capacity(2);
            extended.push(first);
            extended.push(second as char);
            if let Some(kind) = symbol_kind(&extended) {
                self.bump();
                return Token::new(kind, extended, line, column);
            }
        }

        let lexeme = first.to_string();
        match symbol_kind(&lexeme) {
            Some(kind) => Token::new(kind, lexeme, line, column),
            None => Token::new(TokenKind::Illegal, lexeme, line, column),
        }
    }

    fn eof_token(&mut self) -> Token {
        Token::new(TokenKind::Eof, "", self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.bump();
                }
                b'#' => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.position).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = *self.source.get(self.position)?;
        if byte == b'\n' {
            self.line += 1;
            self.column = 0;
        }
        self.position += 1;
        self.column += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next();
            let done = token.kind.is_eof();
            out.push((token.kind, token.literal));
            if done {
                break;
            }
        }
        out
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokens(source).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            tokens("println fn true false if else type foo_bar push!"),
            vec![
                (TokenKind::Identifier, "println".into()),
                (TokenKind::Function, "fn".into()),
                (TokenKind::Boolean, "true".into()),
                (TokenKind::Boolean, "false".into()),
                (TokenKind::If, "if".into()),
                (TokenKind::Else, "else".into()),
                (TokenKind::TypeKeyword, "type".into()),
                (TokenKind::Identifier, "foo_bar".into()),
                (TokenKind::Identifier, "push!".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn numbers_leave_sign_and_dot_to_the_parser() {
        assert_eq!(
            tokens("-42 3.14"),
            vec![
                (TokenKind::Minus, "-".into()),
                (TokenKind::Number, "42".into()),
                (TokenKind::Number, "3".into()),
                (TokenKind::Dot, ".".into()),
                (TokenKind::Number, "14".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn symbols_with_two_char_lookahead() {
        assert_eq!(
            kinds("( ) [ ] { } : \\ - . ->"),
            vec![
                TokenKind::OpenParen,
                TokenKind::ClosedParen,
                TokenKind::OpenBracket,
                TokenKind::ClosedBracket,
                TokenKind::OpenBrace,
                TokenKind::ClosedBrace,
                TokenKind::Colon,
                TokenKind::Backslash,
                TokenKind::Minus,
                TokenKind::Dot,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_with_escapes() {
        assert_eq!(
            tokens(r#""a \"quoted\"\n\tword \x""#),
            vec![
                (TokenKind::DoubleQuote, "\"".into()),
                (TokenKind::String, "a \"quoted\"\n\tword \\x".into()),
                (TokenKind::DoubleQuote, "\"".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn single_quoted_string() {
        assert_eq!(
            tokens("'hello'"),
            vec![
                (TokenKind::SingleQuote, "'".into()),
                (TokenKind::String, "hello".into()),
                (TokenKind::SingleQuote, "'".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn unterminated_string_hits_eof() {
        assert_eq!(
            tokens("\"oops"),
            vec![
                (TokenKind::DoubleQuote, "\"".into()),
                (TokenKind::String, "oops".into()),
                (TokenKind::Eof, "".into()),
            ]
        );
    }

    #[test]
    fn comments_are_whitespace() {
        assert_eq!(
            kinds("a # rest of line\nb"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn illegal_character() {
        let toks = tokens("a @ b");
        assert_eq!(toks[1], (TokenKind::Illegal, "@".into()));
    }

    #[test]
    fn positions_are_one_based_and_track_lines() {
        let mut lexer = Lexer::new("one\n  two");
        let first = lexer.next();
        assert_eq!((first.line, first.column), (1, 1));
        let second = lexer.next();
        assert_eq!((second.line, second.column), (2, 3));
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::new("x");
        lexer.next();
        assert!(lexer.next().kind.is_eof());
        assert!(lexer.next().kind.is_eof());
        assert!(lexer.next().kind.is_eof());
    }
}
