//! Parser for sheet files

use crate::error::Result;
use std::fs;
use std::path::Path;
use tinycalc_engine::engine::CellRef;

/// Read a sheet file into `(cell, content)` pairs, in file order.
pub fn parse_sheet(path: &Path) -> Result<Vec<(CellRef, String)>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_sheet_content(&content))
}

/// Parse sheet content from a string.
///
/// Accepts `\r\n` or `\n` line endings. Lines without a `:` or with an
/// address outside the sheet are skipped with a warning.
pub fn parse_sheet_content(content: &str) -> Vec<(CellRef, String)> {
    let mut cells = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let Some((address, value)) = line.split_once(':') else {
            tracing::warn!(line = line_num + 1, "skipping line without ':'");
            continue;
        };

        let Some(at) = CellRef::parse(address.trim()) else {
            tracing::warn!(line = line_num + 1, address, "skipping invalid cell reference");
            continue;
        };

        if value.trim().is_empty() {
            continue;
        }
        cells.push((at, value.to_string()));
    }

    cells
}
