//! Number and cell formatting for display and string concatenation.

use super::{ErrorKind, Value};

/// Marker shown in place of an error value in the grid.
pub const ERROR_MARKER: &str = "<error>";

/// Format a number like C's `%g` (6 significant digits).
pub fn format_general(n: f64) -> String {
    format_significant(n, 6)
}

/// Format a number like C's `%.{precision}g`.
pub fn format_significant(n: f64, precision: usize) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, n);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= precision as i32 {
        let mantissa = strip_trailing_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Format a value for a grid cell of `width` characters.
///
/// Numbers use `%g`, falling back to 5 significant digits when that does not
/// fit; text and errors are truncated to the width.
pub fn format_value(value: &Value, width: usize, show_error_messages: bool) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(n) => {
            let text = format_general(*n);
            if text.chars().count() > width {
                format_significant(*n, 5)
            } else {
                text
            }
        }
        Value::String(_) | Value::Text(_) => {
            let text = value.as_str().unwrap_or_default();
            text.chars().take(width).collect()
        }
        Value::Error(kind) => format_error(*kind, show_error_messages)
            .chars()
            .take(width)
            .collect(),
    }
}

pub fn format_error(kind: ErrorKind, show_error_messages: bool) -> String {
    if show_error_messages {
        kind.message().to_string()
    } else {
        ERROR_MARKER.to_string()
    }
}
