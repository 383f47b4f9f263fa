//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B12", "Z256") and zero-indexed column/row coordinates.
//!
//! The sheet is 26 columns (`A`..`Z`) by 256 rows, so a reference is always a
//! single letter followed by a 1-based row number.
//!
//! # Examples
//!
//! ```
//! use tinycalc_engine::engine::CellRef;
//!
//! let cell = CellRef::parse("B3").unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Number of addressable columns (`A`..=`Z`).
pub const MAX_COLS: usize = 26;
/// Number of addressable rows (`1`..=`256`).
pub const MAX_ROWS: usize = 256;

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellRef {
    pub row: u16,
    pub col: u8,
}

impl CellRef {
    /// Build a reference from 0-based coordinates, or `None` when outside the sheet.
    pub fn new(col: usize, row: usize) -> Option<CellRef> {
        if col < MAX_COLS && row < MAX_ROWS {
            Some(CellRef {
                col: col as u8,
                row: row as u16,
            })
        } else {
            None
        }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "z256").
    /// Returns None if the input is invalid or outside the sheet.
    pub fn parse(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let letter = caps["letter"].as_bytes()[0].to_ascii_uppercase();
        let row = caps["number"].parse::<usize>().ok()?.checked_sub(1)?;
        CellRef::new((letter - b'A') as usize, row)
    }

    pub fn col_index(&self) -> usize {
        self.col as usize
    }

    pub fn row_index(&self) -> usize {
        self.row as usize
    }

    /// Convert a column index to its letter (0 -> A, 25 -> Z).
    pub fn col_to_letter(col: usize) -> char {
        (b'A' + (col % MAX_COLS) as u8) as char
    }
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letter>[A-Za-z])(?<number>[0-9]{1,5})$")
            .expect("cell reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letter(self.col_index()), self.row + 1)
    }
}

/// A normalized rectangular block of cells (`from` is the top-left corner).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct CellRange {
    pub from: CellRef,
    pub to: CellRef,
}

impl CellRange {
    /// Build a range from two corners given in any order.
    pub fn new(a: CellRef, b: CellRef) -> CellRange {
        CellRange {
            from: CellRef {
                col: a.col.min(b.col),
                row: a.row.min(b.row),
            },
            to: CellRef {
                col: a.col.max(b.col),
                row: a.row.max(b.row),
            },
        }
    }

    /// Iterate every address in the block, column by column.
    pub fn cells(self) -> impl Iterator<Item = CellRef> {
        let (rows_from, rows_to) = (self.from.row, self.to.row);
        (self.from.col..=self.to.col)
            .flat_map(move |col| (rows_from..=rows_to).map(move |row| CellRef { col, row }))
    }

    pub fn cell_count(&self) -> usize {
        ((self.to.col - self.from.col) as usize + 1) * ((self.to.row - self.from.row) as usize + 1)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}
