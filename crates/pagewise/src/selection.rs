//! Row selection over the displayed page.
//!
//! Rows are addressed by their position in the current page. Records whose
//! `readonly` field is truthy never change state. In single-select mode at
//! most one row is selected; selecting another row moves the selection.

use std::collections::BTreeSet;

use pagewise_query::{Record, Seekable, Value};

/// Returns `true` if the record's `readonly` field is truthy.
///
/// Truthy means `true`, a non-zero number, a non-empty string or any
/// array or object.
pub fn is_readonly(record: &Record) -> bool {
    match record.seeker_field_value("readonly") {
        Value::Bool(flag) => flag,
        Value::Number(n) => n.to_f64() != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Composite(_) => true,
        Value::None => false,
    }
}

/// Selected rows of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rows: BTreeSet<usize>,
    all_selected: bool,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Selection::default()
    }

    /// Whether a row is selected.
    pub fn is_selected(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// Number of selected rows.
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Selected row positions, in page order.
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    /// State the next [`toggle_all`](Self::toggle_all) will apply.
    pub fn next_toggle_all_state(&self) -> bool {
        !self.all_selected
    }

    /// Selects a row. Returns `true` if its state changed.
    pub fn select(&mut self, page: &[Record], row: usize, multiselect: bool) -> bool {
        if !Self::mutable(page, row) || self.is_selected(row) {
            return false;
        }
        if !multiselect {
            self.rows.clear();
        }
        self.rows.insert(row)
    }

    /// Unselects a row. Returns `true` if its state changed.
    pub fn unselect(&mut self, page: &[Record], row: usize) -> bool {
        Self::mutable(page, row) && self.rows.remove(&row)
    }

    /// Flips a row. Returns `true` if its state changed.
    pub fn toggle(&mut self, page: &[Record], row: usize, multiselect: bool) -> bool {
        if self.is_selected(row) {
            self.unselect(page, row)
        } else {
            self.select(page, row, multiselect)
        }
    }

    /// Selects every row, or unselects every row if the last call selected
    /// them. Read-only rows are skipped. Returns the state applied.
    pub fn toggle_all(&mut self, page: &[Record]) -> bool {
        self.all_selected = !self.all_selected;
        for row in 0..page.len() {
            if self.all_selected {
                self.select(page, row, true);
            } else {
                self.unselect(page, row);
            }
        }
        self.all_selected
    }

    /// Forgets the whole selection, read-only rows included.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.all_selected = false;
    }

    fn mutable(page: &[Record], row: usize) -> bool {
        page.get(row).is_some_and(|record| !is_readonly(record))
    }
}
