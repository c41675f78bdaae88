//! FILENAME: engine/src/calc/mod.rs
//! PURPOSE: The calculation-engine boundary.
//! CONTEXT: The whole workbook is materialized into this contract (sheet name
//! -> A1 address -> cell record) before evaluation, because formulas may
//! reference any sheet. Evaluation itself is delegated to the Rhai scripting
//! engine; this module owns the shape of its input and the write-back of its
//! output. Cells the engine cannot compute keep their cached value.

mod eval;
pub mod preprocess;

use std::collections::HashMap;

use crate::cell::{CellKind, CellValue};
use crate::coord::{coord_to_a1, parse_a1};
use crate::sheet::Workbook;
use crate::style::StylePayload;

/// One cell record in the calculation contract.
#[derive(Debug, Clone, Default)]
pub struct CalcCell {
    /// Current value; rewritten in place by evaluation for formula cells.
    pub value: CellValue,
    /// Formula text with the `=` marker restored, as the contract expects.
    pub formula: Option<String>,
    pub kind: Option<CellKind>,
    /// Cached display text; refreshed alongside the value on evaluation.
    pub text: Option<String>,
    pub style: Option<StylePayload>,
}

impl CalcCell {
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.formula.is_none() && self.text.is_none()
    }

    /// Display precedence: formatted/cached text, then the value.
    pub fn display(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.value.display(),
        }
    }
}

/// One materialized sheet, keyed by A1 address.
#[derive(Debug, Clone, Default)]
pub struct CalcSheet {
    pub name: String,
    pub cells: HashMap<String, CalcCell>,
}

impl CalcSheet {
    /// Bounding box of non-empty cells as (rows, cols), at least 1x1.
    pub fn used_range(&self) -> (usize, usize) {
        let mut max_row = 0usize;
        let mut max_col = 0usize;
        for (addr, cell) in &self.cells {
            if cell.is_empty() {
                continue;
            }
            if let Some((row, col)) = parse_a1(addr) {
                max_row = max_row.max(row as usize + 1);
                max_col = max_col.max(col as usize + 1);
            }
        }
        (max_row.max(1), max_col.max(1))
    }
}

/// The full materialized workbook handed to the calculation engine.
#[derive(Debug, Clone, Default)]
pub struct CalcWorkbook {
    pub sheets: Vec<CalcSheet>,
}

impl CalcWorkbook {
    /// Materialize every sheet of the workbook. Empty cells are skipped; the
    /// contract is sparse.
    pub fn from_workbook(workbook: &Workbook) -> Self {
        let mut sheets = Vec::with_capacity(workbook.sheets.len());
        for sheet in &workbook.sheets {
            let mut cells = HashMap::new();
            for (r, row) in sheet.data.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    let addr = coord_to_a1((r as u32, c as u32));
                    cells.insert(
                        addr,
                        CalcCell {
                            value: cell.value().clone(),
                            formula: cell.formula().map(|f| format!("={}", f)),
                            kind: match cell {
                                crate::cell::Cell::Rich(rich) => rich.kind,
                                crate::cell::Cell::Scalar(_) => None,
                            },
                            text: cell.cached_text().map(str::to_string),
                            style: cell.style().cloned(),
                        },
                    );
                }
            }
            sheets.push(CalcSheet {
                name: sheet.name.clone(),
                cells,
            });
        }
        CalcWorkbook { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&CalcSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Evaluate every formula cell in dependency order, rewriting value and
    /// cached text in place. Individual failures are logged and tolerated.
    pub fn evaluate(&mut self) {
        eval::evaluate_workbook(self);
    }
}
