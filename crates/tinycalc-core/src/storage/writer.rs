//! Writer for sheet files

use crate::document::Sheet;
use crate::error::{CoreError, Result};
use std::fs;
use std::path::Path;

/// Write a sheet to `path`.
///
/// The content goes to `<path>.tmp` first and is renamed over `path`, so a
/// failed write never truncates an existing file.
pub fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = write_sheet_content(sheet)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Write a sheet to a string, one `\r\n`-terminated line per non-empty cell
/// in row-major order.
pub fn write_sheet_content(sheet: &Sheet) -> Result<String> {
    let mut cells: Vec<_> = sheet
        .store()
        .iter()
        .filter_map(|(_, cell)| cell.content().map(|content| (cell.at(), content)))
        .collect();
    cells.sort_by_key(|(at, _)| (at.row, at.col));

    let mut out = String::new();
    for (at, content) in cells {
        if content.contains(['\r', '\n']) {
            return Err(CoreError::MultilineContent(at));
        }
        out.push_str(&format!("{}:{}\r\n", at, content));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tinycalc_engine::engine::CellRef;

    fn cell(name: &str) -> CellRef {
        CellRef::parse(name).unwrap()
    }

    #[test]
    fn test_write_raw_content() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("A1"), "42").unwrap();
        sheet.set_cell(cell("A2"), "'Hello").unwrap();
        sheet.set_cell(cell("A3"), "=A1 + 1").unwrap();
        let content = write_sheet_content(&sheet).unwrap();
        assert_eq!(content, "A1:=42\r\nA2:'Hello\r\nA3:=A1 + 1\r\n");
    }

    #[test]
    fn test_skip_placeholders_and_sort_row_major() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("B2"), "=SUM(A1:A3)").unwrap();
        sheet.set_cell(cell("C1"), "3").unwrap();
        sheet.set_cell(cell("A2"), "2").unwrap();
        let content = write_sheet_content(&sheet).unwrap();
        assert_eq!(content, "C1:=3\r\nA2:=2\r\nB2:=SUM(A1:A3)\r\n");
    }

    #[test]
    fn test_multiline_content_is_rejected() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("A1"), "two\nlines").unwrap();
        let err = write_sheet_content(&sheet).unwrap_err();
        assert!(matches!(err, CoreError::MultilineContent(at) if at == cell("A1")));
    }
}
