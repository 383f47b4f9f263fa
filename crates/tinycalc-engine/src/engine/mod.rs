//! Formula language API.
//!
//! This module provides everything needed to evaluate a formula:
//!
//! - [`CellRef`], [`CellRange`] - Cell addressing (A1 notation ↔ col/row indices)
//! - [`Value`], [`ErrorKind`] - Typed evaluation results
//! - [`Lexer`], [`Token`] - Formula tokenizer
//! - [`evaluate`], [`CellSource`] - Recursive-descent evaluator
//! - [`extract_dependencies`] - Find the cells a formula reads
//! - [`format_value`] - Format values for display

mod cell_ref;
mod deps;
mod eval;
mod format;
mod lexer;
mod value;

pub use cell_ref::{CellRange, CellRef, MAX_COLS, MAX_ROWS};
pub use deps::{Reference, extract_dependencies, extract_references};
pub use eval::{CellSource, evaluate};
pub use format::{ERROR_MARKER, format_error, format_general, format_significant, format_value};
pub use lexer::{LexError, Lexer, RelOp, Token};
pub use value::{ErrorKind, TextView, Value, parse_leading_number};
