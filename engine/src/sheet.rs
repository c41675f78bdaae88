//! FILENAME: engine/src/sheet.rs
//! PURPOSE: The multi-sheet workbook model and its structural invariants.
//! CONTEXT: Sheets hold dense row-major cell grids because that is the shape
//! the persisted JSON contract uses. Ragged rows (from partial edits or
//! hand-written blobs) must be tolerated by readers and are corrected by
//! normalization before persistence.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Default dimensions for a freshly created sheet.
pub const DEFAULT_ROW_COUNT: usize = 50;
pub const DEFAULT_COLUMN_COUNT: usize = 26;

/// Declared sheet dimensions. May be absent in stored blobs, in which case
/// it is recomputed from the actual row extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    pub row_count: usize,
    pub column_count: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            row_count: DEFAULT_ROW_COUNT,
            column_count: DEFAULT_COLUMN_COUNT,
        }
    }
}

/// Produce an all-empty rectangular grid.
pub fn empty_grid(rows: usize, cols: usize) -> Vec<Vec<Cell>> {
    vec![vec![Cell::empty(); cols]; rows]
}

/// Represents a single worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    /// Position within the workbook's sheet sequence; kept consistent after
    /// insert/delete by [`Workbook::reindex`].
    #[serde(default)]
    pub index: usize,
    /// Row-major cell grid. Rectangular once normalized.
    #[serde(default)]
    pub data: Vec<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SheetConfig>,
}

impl Sheet {
    /// Create a blank rectangular sheet.
    pub fn blank(name: impl Into<String>, rows: usize, cols: usize) -> Self {
        Sheet {
            name: name.into(),
            index: 0,
            data: empty_grid(rows, cols),
            config: Some(SheetConfig {
                row_count: rows,
                column_count: cols,
            }),
        }
    }

    /// Pad ragged rows and grow the grid to the configured extents. When the
    /// config is missing (or smaller than the data), it is recomputed from
    /// the actual extents.
    pub fn normalize(&mut self) {
        let data_rows = self.data.len();
        let data_cols = self.data.iter().map(Vec::len).max().unwrap_or(0);

        let declared = self.config.unwrap_or(SheetConfig {
            row_count: data_rows,
            column_count: data_cols,
        });
        let rows = declared.row_count.max(data_rows).max(1);
        let cols = declared.column_count.max(data_cols).max(1);

        self.data.resize_with(rows, Vec::new);
        for row in &mut self.data {
            row.resize_with(cols, Cell::empty);
        }
        self.config = Some(SheetConfig {
            row_count: rows,
            column_count: cols,
        });
    }

    /// The cell at (row, col), if present. Tolerates ragged rows.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.data.get(row).and_then(|r| r.get(col))
    }

    /// Mutable access to the cell at (row, col), growing the grid if needed.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        if self.data.len() <= row {
            self.data.resize_with(row + 1, Vec::new);
        }
        let row_vec = &mut self.data[row];
        if row_vec.len() <= col {
            row_vec.resize_with(col + 1, Cell::empty);
        }
        &mut row_vec[col]
    }

    /// Bounding box of non-empty cells as (rows, cols), at least 1x1.
    pub fn used_range(&self) -> (usize, usize) {
        let mut max_row = 0usize;
        let mut max_col = 0usize;
        for (r, row) in self.data.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    max_row = max_row.max(r + 1);
                    max_col = max_col.max(c + 1);
                }
            }
        }
        (max_row.max(1), max_col.max(1))
    }
}

/// Represents the full multi-sheet document. Sheet order is tab order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// A workbook with a single blank default-sized sheet.
    pub fn blank() -> Self {
        let mut workbook = Workbook {
            sheets: vec![Sheet::blank(
                "Sheet1",
                DEFAULT_ROW_COUNT,
                DEFAULT_COLUMN_COUNT,
            )],
        };
        workbook.reindex();
        workbook
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        let mut workbook = Workbook { sheets };
        workbook.normalize();
        workbook
    }

    /// Normalize every sheet and repair the index invariant.
    pub fn normalize(&mut self) {
        for sheet in &mut self.sheets {
            sheet.normalize();
        }
        self.reindex();
    }

    /// Rewrite each sheet's `index` to match its position in the sequence.
    pub fn reindex(&mut self) {
        for (i, sheet) in self.sheets.iter_mut().enumerate() {
            sheet.index = i;
        }
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    /// Generate a unique sheet name of the form `Sheet{n}`.
    pub fn unique_sheet_name(&self) -> String {
        let mut counter = self.sheets.len() + 1;
        loop {
            let candidate = format!("Sheet{}", counter);
            if !self.contains_name(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn test_blank_sheet_dimensions() {
        let sheet = Sheet::blank("Sheet1", 50, 26);
        assert_eq!(sheet.data.len(), 50);
        assert!(sheet.data.iter().all(|row| row.len() == 26));
        assert!(sheet.data.iter().flatten().all(Cell::is_empty));
    }

    #[test]
    fn test_normalize_pads_ragged_rows() {
        let mut sheet = Sheet {
            name: "S".to_string(),
            index: 0,
            data: vec![
                vec![Cell::new_number(1.0), Cell::new_number(2.0), Cell::new_number(3.0)],
                vec![Cell::new_number(4.0)],
                vec![],
            ],
            config: None,
        };
        sheet.normalize();
        let config = sheet.config.unwrap();
        assert_eq!(config.row_count, 3);
        assert_eq!(config.column_count, 3);
        assert!(sheet.data.iter().all(|row| row.len() == 3));
        assert_eq!(sheet.cell(1, 2), Some(&Cell::empty()));
    }

    #[test]
    fn test_normalize_grows_to_declared_config() {
        let mut sheet = Sheet {
            name: "S".to_string(),
            index: 0,
            data: vec![vec![Cell::new_text("x")]],
            config: Some(SheetConfig {
                row_count: 10,
                column_count: 4,
            }),
        };
        sheet.normalize();
        assert_eq!(sheet.data.len(), 10);
        assert!(sheet.data.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn test_used_range() {
        let mut sheet = Sheet::blank("S", 50, 26);
        assert_eq!(sheet.used_range(), (1, 1));
        *sheet.cell_mut(4, 2) = Cell::new_text("x");
        *sheet.cell_mut(1, 7) = Cell::new_number(9.0);
        assert_eq!(sheet.used_range(), (5, 8));
    }

    #[test]
    fn test_cell_mut_grows_grid() {
        let mut sheet = Sheet::blank("S", 2, 2);
        sheet.cell_mut(5, 5).commit_value(CellValue::Number(1.0));
        assert_eq!(sheet.cell(5, 5).map(|c| c.value().clone()),
            Some(CellValue::Number(1.0)));
    }

    #[test]
    fn test_unique_sheet_name_skips_taken() {
        let mut workbook = Workbook::blank();
        workbook.sheets.push(Sheet::blank("Sheet2", 2, 2));
        workbook.sheets.push(Sheet::blank("Sheet4", 2, 2));
        workbook.reindex();
        // Three sheets -> first candidate is Sheet4, which is taken.
        assert_eq!(workbook.unique_sheet_name(), "Sheet5");
    }

    #[test]
    fn test_reindex() {
        let mut workbook = Workbook::from_sheets(vec![
            Sheet::blank("A", 1, 1),
            Sheet::blank("B", 1, 1),
            Sheet::blank("C", 1, 1),
        ]);
        workbook.sheets.remove(1);
        workbook.reindex();
        assert_eq!(workbook.sheets[1].name, "C");
        assert_eq!(workbook.sheets[1].index, 1);
    }
}
