use super::Sheet;
use super::store::CellId;
use tinycalc_engine::engine::{CellRef, ErrorKind, TextView, Value, evaluate, format_value};

impl Sheet {
    /// Bring `id` up to date, then every cell that reads it.
    ///
    /// Referenced cells are evaluated before the formula runs. A cell that is
    /// reached again while it is still being evaluated is part of a cycle and
    /// caches a cyclic reference error instead of running its formula.
    pub(crate) fn evaluate_cell(&mut self, id: CellId) {
        let cell = self.store.cell(id);
        if !cell.flags.dirty {
            return;
        }

        if !cell.flags.formula {
            let cached = match cell.shared_content() {
                Some(content) => {
                    let start = usize::from(content.starts_with('\''));
                    Value::Text(TextView::new(content.clone(), start))
                }
                None => Value::Null,
            };
            self.store.cell_mut(id).cached = cached;
        } else if cell.flags.visiting {
            tracing::warn!(cell = %cell.at(), "cyclic reference");
            self.store.cell_mut(id).cached = Value::Error(ErrorKind::CyclicReference);
        } else {
            let reads = cell.reads().to_vec();
            {
                let cell = self.store.cell_mut(id);
                cell.flags.visiting = true;
                cell.cached = Value::Null;
            }
            for target in reads {
                self.evaluate_cell(target);
            }
            // A cycle through this cell may already have settled it.
            let cell = self.store.cell(id);
            if cell.flags.dirty {
                let value = match cell.content() {
                    Some(content) => evaluate(&content[1..], &self.store),
                    None => Value::Null,
                };
                tracing::trace!(cell = %cell.at(), ?value, "evaluated");
                self.store.cell_mut(id).cached = value;
            }
            self.store.cell_mut(id).flags.visiting = false;
        }

        self.store.cell_mut(id).flags.dirty = false;

        let readers = self.store.cell(id).read_by().to_vec();
        for reader in readers {
            // A reader still being visited is forcing this cell through its
            // reads and runs its own formula once they settle.
            if self.store.cell(reader).flags.visiting {
                continue;
            }
            self.evaluate_cell(reader);
        }
    }

    /// Re-evaluate every formula cell, regardless of load or edit order.
    pub fn recalculate(&mut self) {
        let formulas: Vec<CellId> = self
            .store
            .iter()
            .filter(|(_, cell)| cell.is_formula())
            .map(|(id, _)| id)
            .collect();
        tracing::debug!(cells = formulas.len(), "recalculating sheet");
        for &id in &formulas {
            self.store.propagate_dirty(id);
        }
        for id in formulas {
            self.evaluate_cell(id);
        }
    }

    /// Evaluate formula text against the current cached values without
    /// storing it anywhere. A leading `=` is optional.
    pub fn evaluate_formula(&self, text: &str) -> Value {
        let text = text.trim();
        let formula = text.strip_prefix('=').unwrap_or(text);
        evaluate(formula, &self.store)
    }

    /// Cached value of a cell, `Null` when it does not exist.
    pub fn value(&self, at: CellRef) -> Value {
        self.store
            .find(at)
            .map(|cell| cell.value().clone())
            .unwrap_or_default()
    }

    /// Raw content of a cell as entered.
    pub fn content(&self, at: CellRef) -> Option<&str> {
        self.store.find(at).and_then(|cell| cell.content())
    }

    /// Get the display text for a cell in a column `width` characters wide.
    pub fn display(&self, at: CellRef, width: usize, show_error_messages: bool) -> String {
        format_value(&self.value(at), width, show_error_messages)
    }
}
