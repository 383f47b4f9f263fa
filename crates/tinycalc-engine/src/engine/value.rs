//! Values produced by formula evaluation.
//!
//! - [`Value`] - the tagged result of evaluating a formula or reading a cell
//! - [`TextView`] - a shared, non-owning view into a cell's stored content
//! - [`ErrorKind`] - the fixed set of formula errors

use std::fmt;
use std::rc::Rc;

use super::format::format_general;

/// The fixed set of errors a formula can evaluate to.
///
/// Errors are ordinary values: they propagate through enclosing operators and
/// become the result of the whole formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidExpression,
    DivideByZero,
    CyclicReference,
    ExpectedLeftParen,
    ExpectedRightParen,
    ExpectedNumeric,
    OutOfMemory,
}

impl ErrorKind {
    /// Static description of the error.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "Invalid argument",
            ErrorKind::InvalidExpression => "Invalid expression",
            ErrorKind::DivideByZero => "Division by zero",
            ErrorKind::CyclicReference => "Cyclic reference",
            ErrorKind::ExpectedLeftParen => "Expected '('",
            ErrorKind::ExpectedRightParen => "Expected ')'",
            ErrorKind::ExpectedNumeric => "Expected numeric value",
            ErrorKind::OutOfMemory => "Out of memory",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A view into a cell's raw content starting at a byte offset.
///
/// The content is shared with the cell that stores it, so producing a view
/// never copies the text.
#[derive(Clone, Debug)]
pub struct TextView {
    source: Rc<str>,
    start: usize,
}

impl TextView {
    /// View `source` from `start` onwards. `start` is clamped to a char boundary
    /// at or before the end of the text.
    pub fn new(source: Rc<str>, start: usize) -> TextView {
        let mut start = start.min(source.len());
        while !source.is_char_boundary(start) {
            start -= 1;
        }
        TextView { source, start }
    }

    pub fn as_str(&self) -> &str {
        &self.source[self.start..]
    }

    /// Whether this view shares storage with `content`.
    pub fn shares(&self, content: &Rc<str>) -> bool {
        Rc::ptr_eq(&self.source, content)
    }
}

impl PartialEq for TextView {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Result of evaluating a formula or reading a cell.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// Absence of content.
    #[default]
    Null,
    Number(f64),
    /// Owned text computed by a formula or taken from a string literal.
    String(String),
    /// Text borrowed from a cell's stored content.
    Text(TextView),
    Error(ErrorKind),
}

impl Value {
    /// `String` or `Text`.
    pub fn is_string_like(&self) -> bool {
        matches!(self, Value::String(_) | Value::Text(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Coerce to a number: strings parse their leading numeric prefix
    /// (0 when there is none), `Null` and errors become 0.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(s) => parse_leading_number(s),
            Value::Text(t) => parse_leading_number(t.as_str()),
            Value::Null | Value::Error(_) => 0.0,
        }
    }

    /// Text rendering used by string concatenation.
    pub fn to_concat_text(&self) -> String {
        match self.as_str() {
            Some(s) => s.to_string(),
            None => format_general(self.to_number()),
        }
    }
}

/// Parse the longest leading decimal number of `s`, like C's `strtod`.
///
/// Leading whitespace is skipped; returns 0 when no digits are found.
pub fn parse_leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("42"), 42.0);
        assert_eq!(parse_leading_number("  3.5kg"), 3.5);
        assert_eq!(parse_leading_number("-2e3x"), -2000.0);
        assert_eq!(parse_leading_number("1e"), 1.0);
        assert_eq!(parse_leading_number(".5"), 0.5);
        assert_eq!(parse_leading_number("abc"), 0.0);
        assert_eq!(parse_leading_number("-"), 0.0);
        assert_eq!(parse_leading_number(""), 0.0);
    }

    #[test]
    fn test_text_view_skips_marker() {
        let content: Rc<str> = Rc::from("'hello");
        let view = TextView::new(content.clone(), 1);
        assert_eq!(view.as_str(), "hello");
        assert!(view.shares(&content));
    }

    #[test]
    fn test_to_number_coercions() {
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::String("12abc".into()).to_number(), 12.0);
        assert_eq!(Value::Number(-1.5).to_number(), -1.5);
    }
}
