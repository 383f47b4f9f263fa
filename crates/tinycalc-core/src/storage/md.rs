//! Markdown export functionality

use crate::document::Sheet;
use std::fmt::Write as _;
use std::path::Path;
use tinycalc_engine::engine::CellRef;

/// Write the sheet to a markdown file.
pub fn write_markdown(path: &Path, sheet: &Sheet, show_error_messages: bool) -> std::io::Result<()> {
    std::fs::write(path, markdown_content(sheet, show_error_messages))
}

/// Render the used area of the sheet as a markdown table.
pub fn markdown_content(sheet: &Sheet, show_error_messages: bool) -> String {
    let mut out = String::from("# Sheet\n\n");

    let Some((min_row, min_col, max_row, max_col)) = find_grid_bounds(sheet) else {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    };

    // Header row with column letters
    out.push_str("|   |");
    for col in min_col..=max_col {
        let _ = write!(out, " {} |", CellRef::col_to_letter(col));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in min_col..=max_col {
        out.push_str("---|");
    }
    out.push('\n');

    for row in min_row..=max_row {
        let _ = write!(out, "| {} |", row + 1); // 1-based row numbers
        for col in min_col..=max_col {
            let display = CellRef::new(col, row)
                .map(|at| sheet.display(at, usize::MAX, show_error_messages))
                .unwrap_or_default();
            let _ = write!(out, " {} |", escape_markdown(&display));
        }
        out.push('\n');
    }

    out
}

/// Bounds (min row, min col, max row, max col) of cells with content.
fn find_grid_bounds(sheet: &Sheet) -> Option<(usize, usize, usize, usize)> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (_, cell) in sheet.store().iter() {
        if cell.content().is_none() {
            continue;
        }
        let (row, col) = (cell.at().row_index(), cell.at().col_index());
        bounds = Some(match bounds {
            None => (row, col, row, col),
            Some((r0, c0, r1, c1)) => (r0.min(row), c0.min(col), r1.max(row), c1.max(col)),
        });
    }
    bounds
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
