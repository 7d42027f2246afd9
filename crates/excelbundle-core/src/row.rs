//! Row type

use std::collections::BTreeMap;

use crate::cell::CellValue;

/// A worksheet row: an ordered, sparse set of cells keyed by column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Row index (0-based)
    index: u32,
    /// Column index → cell value
    cells: BTreeMap<u16, CellValue>,
}

impl Row {
    /// Create a new row without cells
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: BTreeMap::new(),
        }
    }

    /// Row index (0-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get a cell by column index
    pub fn cell(&self, col: u16) -> Option<&CellValue> {
        self.cells.get(&col)
    }

    /// Trimmed, non-empty text of the string cell at `col`.
    ///
    /// Missing cells and cells of any other type read as `None`.
    pub fn string_value(&self, col: u16) -> Option<&str> {
        self.cell(col).and_then(CellValue::string_value)
    }

    /// Index of the last populated column, if any
    pub fn last_column(&self) -> Option<u16> {
        self.cells.keys().next_back().copied()
    }

    /// Index of the first populated column, if any
    pub fn first_column(&self) -> Option<u16> {
        self.cells.keys().next().copied()
    }

    /// Set a cell, replacing any previous value in that column
    pub fn set(&mut self, col: u16, value: CellValue) {
        self.cells.insert(col, value);
    }

    /// Remove a cell
    pub fn remove(&mut self, col: u16) -> Option<CellValue> {
        self.cells.remove(&col)
    }

    /// Check if row has any cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of populated cells in the row
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over populated cells in column order
    pub fn cells(&self) -> impl Iterator<Item = (u16, &CellValue)> {
        self.cells.iter().map(|(&col, value)| (col, value))
    }
}
