//! Fixed-width table rendering of a sheet for the terminal.

use crate::config::Config;
use tinycalc_core::{CellRef, Sheet, Value};

/// Render every row and column from `A1` up to the last cell with content.
/// Numbers are right-aligned, everything else left-aligned.
pub fn render_table(sheet: &Sheet, config: &Config) -> String {
    let Some((max_row, max_col)) = used_extent(sheet) else {
        return String::new();
    };
    let width = config.column_width;
    let mut out = String::new();

    let mut header = String::from("   ");
    for col in 0..=max_col {
        header.push(' ');
        header.push_str(&format!("{:^width$}", CellRef::col_to_letter(col)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for row in 0..=max_row {
        let mut line = format!("{:>3}", row + 1);
        for col in 0..=max_col {
            line.push(' ');
            let Some(at) = CellRef::new(col, row) else {
                continue;
            };
            let text = sheet.display(at, width, config.show_error_messages);
            if matches!(sheet.value(at), Value::Number(_)) {
                line.push_str(&format!("{:>width$}", text));
            } else {
                line.push_str(&format!("{:<width$}", text));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Largest (row, col) holding content.
fn used_extent(sheet: &Sheet) -> Option<(usize, usize)> {
    sheet
        .store()
        .iter()
        .filter(|(_, cell)| cell.content().is_some())
        .map(|(_, cell)| (cell.at().row_index(), cell.at().col_index()))
        .reduce(|(r0, c0), (r1, c1)| (r0.max(r1), c0.max(c1)))
}
