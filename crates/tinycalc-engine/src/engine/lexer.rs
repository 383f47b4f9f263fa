//! Formula tokenizer.
//!
//! Turns formula text (without its leading `=`) into a stream of [`Token`]s,
//! one per call to [`Lexer::next_token`]. Whitespace is insignificant.
//!
//! Identifiers are upper-cased and classified as either a cell reference
//! (`B12`), a range (`B1:B9`) or a builtin function name. Anything that is
//! none of those becomes a [`Token::Error`].

use std::fmt;

use super::cell_ref::CellRef;
use crate::builtins::Function;

/// Why the lexer could not produce a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    UnterminatedString,
    UnknownIdentifier(String),
    MalformedRange(String),
    UnexpectedChar(char),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedString => write!(f, "unterminated string literal"),
            LexError::UnknownIdentifier(name) => write!(f, "unknown identifier '{}'", name),
            LexError::MalformedRange(text) => write!(f, "malformed range '{}'", text),
            LexError::UnexpectedChar(ch) => write!(f, "unexpected character '{}'", ch),
        }
    }
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelOp {
    /// Apply the operator to the result of a three-way comparison.
    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            RelOp::Eq => ordering == Equal,
            RelOp::Ne => ordering != Equal,
            RelOp::Lt => ordering == Less,
            RelOp::Le => ordering != Greater,
            RelOp::Gt => ordering == Greater,
            RelOp::Ge => ordering != Less,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    CellRef(CellRef),
    /// Range corners as written; normalization happens at the use site.
    Range(CellRef, CellRef),
    Number(f64),
    Str(&'a str),
    Rel(RelOp),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Function(Function),
    End,
    Error(LexError),
}

/// Cursor over formula text.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.src[self.pos..].chars().next() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Produce the next token. Returns [`Token::End`] forever once the input
    /// is exhausted.
    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();

        let Some(ch) = self.peek() else {
            return Token::End;
        };

        if ch.is_ascii_alphabetic() {
            return self.identifier();
        }
        let leading_dot = ch == b'.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
        if ch.is_ascii_digit() || leading_dot {
            return self.number();
        }

        self.pos += 1;
        match ch {
            b'=' => Token::Rel(RelOp::Eq),
            b'<' => match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    Token::Rel(RelOp::Le)
                }
                Some(b'>') => {
                    self.pos += 1;
                    Token::Rel(RelOp::Ne)
                }
                _ => Token::Rel(RelOp::Lt),
            },
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.pos += 1;
                    Token::Rel(RelOp::Ge)
                } else {
                    Token::Rel(RelOp::Gt)
                }
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'%' => Token::Percent,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b'"' | b'\'' => self.string(ch),
            _ => {
                // Step back and report the full (possibly multi-byte) character.
                self.pos -= 1;
                let bad = self.src[self.pos..].chars().next().unwrap_or('?');
                self.pos += bad.len_utf8();
                Token::Error(LexError::UnexpectedChar(bad))
            }
        }
    }

    fn identifier(&mut self) -> Token<'a> {
        let word = self.take_while(|c| c.is_ascii_alphanumeric());
        let upper = word.to_ascii_uppercase();

        if let Some(start) = CellRef::parse(&upper) {
            if self.peek() != Some(b':') {
                return Token::CellRef(start);
            }
            self.pos += 1;
            let end_word = self.take_while(|c| c.is_ascii_alphanumeric());
            return match CellRef::parse(end_word) {
                Some(end) => Token::Range(start, end),
                None => Token::Error(LexError::MalformedRange(format!("{}:{}", upper, end_word))),
            };
        }

        match Function::lookup(&upper) {
            Some(function) => Token::Function(function),
            None => Token::Error(LexError::UnknownIdentifier(upper)),
        }
    }

    fn number(&mut self) -> Token<'a> {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.take_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some(b'+' | b'-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1 + sign;
                self.take_while(|c| c.is_ascii_digit());
            }
        }
        let text = &self.src[start..self.pos];
        match text.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Error(LexError::UnexpectedChar('.')),
        }
    }

    fn string(&mut self, quote: u8) -> Token<'a> {
        let start = self.pos;
        match self.src.as_bytes()[start..].iter().position(|&c| c == quote) {
            Some(len) => {
                self.pos = start + len + 1;
                Token::Str(&self.src[start..start + len])
            }
            None => {
                self.pos = self.src.len();
                Token::Error(LexError::UnterminatedString)
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields tokens up to (not including) the end of input.
    fn next(&mut self) -> Option<Token<'a>> {
        match self.next_token() {
            Token::End => None,
            token => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(name: &str) -> CellRef {
        CellRef::parse(name).unwrap()
    }

    #[test]
    fn test_operators_and_literals() {
        let tokens: Vec<_> = Lexer::new(" 1.5 + 'ab' <> \"c\" <= 2e3 % (3)").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Number(1.5),
                Token::Plus,
                Token::Str("ab"),
                Token::Rel(RelOp::Ne),
                Token::Str("c"),
                Token::Rel(RelOp::Le),
                Token::Number(2000.0),
                Token::Percent,
                Token::LParen,
                Token::Number(3.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_references_and_functions() {
        let tokens: Vec<_> = Lexer::new("sum(b1:B9) + a12 * Log10(c3)").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Function(Function::lookup("SUM").unwrap()),
                Token::LParen,
                Token::Range(cell("B1"), cell("B9")),
                Token::RParen,
                Token::Plus,
                Token::CellRef(cell("A12")),
                Token::Star,
                Token::Function(Function::lookup("LOG10").unwrap()),
                Token::LParen,
                Token::CellRef(cell("C3")),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_lexical_errors() {
        assert_eq!(
            Lexer::new("FOO").next_token(),
            Token::Error(LexError::UnknownIdentifier("FOO".into()))
        );
        assert_eq!(
            Lexer::new("A257").next_token(),
            Token::Error(LexError::UnknownIdentifier("A257".into()))
        );
        assert_eq!(
            Lexer::new("A1:X").next_token(),
            Token::Error(LexError::MalformedRange("A1:X".into()))
        );
        assert_eq!(
            Lexer::new("'open").next_token(),
            Token::Error(LexError::UnterminatedString)
        );
        assert_eq!(Lexer::new("#").next_token(), Token::Error(LexError::UnexpectedChar('#')));
    }

    #[test]
    fn test_end_is_sticky() {
        let mut lexer = Lexer::new("  ");
        assert_eq!(lexer.next_token(), Token::End);
        assert_eq!(lexer.next_token(), Token::End);
    }
}
