//! Dependency extraction from formula text.
//!
//! Re-lexes a formula to find every cell it reads: single references such as
//! `A1` and every address inside a range such as `B2:C5`. String literals are
//! tokens of their own, so references inside quotes are never picked up.
//! Scanning stops at the first lexical error.

use super::cell_ref::{CellRange, CellRef};
use super::lexer::{Lexer, Token};

/// A cell or block of cells read by a formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference {
    Cell(CellRef),
    Range(CellRange),
}

impl Reference {
    /// The block of cells covered; a single cell is a 1x1 block.
    pub fn range(self) -> CellRange {
        match self {
            Reference::Cell(at) => CellRange::new(at, at),
            Reference::Range(range) => range,
        }
    }
}

/// Extract the references of a formula, in source order.
pub fn extract_references(formula: &str) -> Vec<Reference> {
    let mut refs = Vec::new();
    for token in Lexer::new(formula) {
        match token {
            Token::CellRef(at) => refs.push(Reference::Cell(at)),
            Token::Range(a, b) => refs.push(Reference::Range(CellRange::new(a, b))),
            Token::Error(_) => break,
            _ => {}
        }
    }
    refs
}

/// Extract every cell address a formula depends on, ranges expanded.
/// Duplicates are kept.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    extract_references(formula)
        .into_iter()
        .flat_map(|r| r.range().cells())
        .collect()
}
