use super::Sheet;
use super::store::CellId;
use crate::error::Result;
use regex::Regex;
use std::rc::Rc;
use std::sync::OnceLock;
use tinycalc_engine::engine::{CellRef, extract_references};

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$")
            .expect("number regex must compile")
    })
}

/// Classify trimmed, non-empty input into stored content and its formula flag.
///
/// Formulas and `'` literals are stored as typed; a bare number becomes a
/// one-term formula so it evaluates to a number.
fn classify(input: &str) -> (Rc<str>, bool) {
    if input.starts_with('=') {
        (Rc::from(input), true)
    } else if number_re().is_match(input) {
        (Rc::from(format!("={input}")), true)
    } else {
        (Rc::from(input), false)
    }
}

impl Sheet {
    /// Set cell contents from input text and settle every affected cell.
    ///
    /// Empty input clears the cell. Setting the content a cell already holds
    /// does nothing. On out-of-memory the graph keeps whatever edges were
    /// built before the failure.
    pub fn set_cell(&mut self, at: CellRef, input: &str) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return self.clear_cell(at);
        }

        let (content, formula) = classify(input);
        if let Some(existing) = self.store.find(at)
            && existing.content() == Some(&*content)
        {
            return Ok(());
        }

        let id = self.store.insert_if_absent(at)?;
        self.replace_content(id, Some(content), formula)
    }

    /// Clear the specified cell. Cells that read it see `Null` from now on.
    pub fn clear_cell(&mut self, at: CellRef) -> Result<()> {
        let Some(id) = self.store.id_of(at) else {
            return Ok(());
        };
        if self.store.cell(id).content().is_none() {
            return Ok(());
        }
        self.replace_content(id, None, false)
    }

    fn replace_content(
        &mut self,
        id: CellId,
        content: Option<Rc<str>>,
        formula: bool,
    ) -> Result<()> {
        let at = self.store.cell(id).at();
        tracing::debug!(cell = %at, content = ?content.as_deref(), "set cell");

        self.store.clear_reads(id);
        let references = match content.as_deref() {
            Some(text) if formula => extract_references(&text[1..]),
            _ => Vec::new(),
        };
        self.store.cell_mut(id).set_content(content, formula);
        self.modified = true;

        for reference in references {
            for target_at in reference.range().cells() {
                let target = self.store.insert_if_absent(target_at)?;
                self.store.add_edge(id, target)?;
                tracing::trace!(cell = %at, reads = %target_at, "added edge");
            }
        }

        self.store.propagate_dirty(id);
        self.evaluate_cell(id);
        Ok(())
    }

    /// Drop empty cells that nothing reads and that read nothing.
    /// Returns the number of cells removed.
    pub fn collect_garbage(&mut self) -> usize {
        let removed = self.store.compact();
        if removed > 0 {
            tracing::debug!(removed, "collected empty cells");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinycalc_engine::engine::{ErrorKind, Value};

    fn cell(name: &str) -> CellRef {
        CellRef::parse(name).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("=A1+1"), (Rc::from("=A1+1"), true));
        assert_eq!(classify("'=not a formula"), (Rc::from("'=not a formula"), false));
        assert_eq!(classify("42"), (Rc::from("=42"), true));
        assert_eq!(classify("-1.5e3"), (Rc::from("=-1.5e3"), true));
        assert_eq!(classify(".5"), (Rc::from("=.5"), true));
        assert_eq!(classify("inf"), (Rc::from("inf"), false));
        assert_eq!(classify("12 apples"), (Rc::from("12 apples"), false));
    }

    #[test]
    fn test_set_cell_classifies_content() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("A1"), "  42 ").unwrap();
        sheet.set_cell(cell("A2"), "'42").unwrap();
        sheet.set_cell(cell("A3"), "hello").unwrap();
        assert_eq!(sheet.content(cell("A1")), Some("=42"));
        assert_eq!(sheet.value(cell("A1")), Value::Number(42.0));
        assert_eq!(sheet.content(cell("A2")), Some("'42"));
        assert_eq!(sheet.value(cell("A2")).as_str(), Some("42"));
        assert_eq!(sheet.value(cell("A3")).as_str(), Some("hello"));
        assert!(sheet.is_modified());
    }

    #[test]
    fn test_same_content_is_a_no_op() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("A1"), "=1+1").unwrap();
        sheet.modified = false;
        sheet.set_cell(cell("A1"), "=1+1").unwrap();
        assert!(!sheet.is_modified());
        sheet.clear_cell(cell("B9")).unwrap();
        assert!(!sheet.is_modified());
        assert!(sheet.store.find(cell("B9")).is_none());
    }

    #[test]
    fn test_range_creates_placeholders() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("D1"), "=SUM(A1:B2)").unwrap();
        assert_eq!(sheet.store.len(), 5);
        let d1 = sheet.store.id_of(cell("D1")).unwrap();
        assert_eq!(sheet.store.cell(d1).reads().len(), 4);
        let a2 = sheet.store.find(cell("A2")).unwrap();
        assert!(a2.is_placeholder());
        assert!(!a2.is_dirty());
        assert_eq!(a2.value(), &Value::Null);

        sheet.set_cell(cell("B2"), "7").unwrap();
        assert_eq!(sheet.value(cell("D1")), Value::Number(7.0));
    }

    #[test]
    fn test_clear_cell_updates_readers() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("A1"), "5").unwrap();
        sheet.set_cell(cell("B1"), "=A1*2").unwrap();
        sheet.set_cell(cell("A1"), "").unwrap();
        assert_eq!(sheet.content(cell("A1")), None);
        assert_eq!(sheet.value(cell("B1")), Value::Number(0.0));
    }

    #[test]
    fn test_breaking_a_cycle_recovers() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("A1"), "=B1").unwrap();
        sheet.set_cell(cell("B1"), "=A1").unwrap();
        assert_eq!(
            sheet.value(cell("A1")),
            Value::Error(ErrorKind::CyclicReference)
        );
        sheet.set_cell(cell("B1"), "3").unwrap();
        assert_eq!(sheet.value(cell("B1")), Value::Number(3.0));
        assert_eq!(sheet.value(cell("A1")), Value::Number(3.0));
    }

    #[test]
    fn test_collect_garbage_keeps_referenced_cells() {
        let mut sheet = Sheet::new();
        sheet.set_cell(cell("C1"), "=SUM(A1:A3)").unwrap();
        sheet.set_cell(cell("A2"), "4").unwrap();
        sheet.set_cell(cell("C1"), "=A2").unwrap();
        // A1 and A3 are now unreferenced placeholders.
        assert_eq!(sheet.collect_garbage(), 2);
        assert!(sheet.store.find(cell("A1")).is_none());
        sheet.set_cell(cell("A2"), "6").unwrap();
        assert_eq!(sheet.value(cell("C1")), Value::Number(6.0));
        assert_eq!(sheet.collect_garbage(), 0);
    }
}
