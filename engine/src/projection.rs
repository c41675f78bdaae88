//! FILENAME: engine/src/projection.rs
//! PURPOSE: Derives the display grid for the active sheet.
//! CONTEXT: Pure with respect to the input workbook: the whole workbook is
//! materialized into the calculation contract, evaluated, and the active
//! sheet's used range is rendered to strings. Safe to call on every
//! active-sheet change or mutation; nothing is cached across calls.

use crate::calc::CalcWorkbook;
use crate::coord::coord_to_a1;
use crate::sheet::Workbook;

/// Project the active sheet to a grid of display strings.
///
/// Per-cell precedence: formatted/cached text, then the (evaluated or raw)
/// value, then the empty string. An out-of-range sheet index yields the 1x1
/// empty grid rather than a panic.
pub fn project(workbook: &Workbook, active_sheet: usize) -> Vec<Vec<String>> {
    let Some(sheet) = workbook.sheet(active_sheet) else {
        return vec![vec![String::new()]];
    };

    let mut calc = CalcWorkbook::from_workbook(workbook);
    calc.evaluate();
    let Some(calc_sheet) = calc.sheet(&sheet.name) else {
        return vec![vec![String::new()]];
    };

    let (rows, cols) = calc_sheet.used_range();
    let mut grid = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut out = Vec::with_capacity(cols);
        for col in 0..cols {
            let addr = coord_to_a1((row as u32, col as u32));
            out.push(
                calc_sheet
                    .cells
                    .get(&addr)
                    .map(|cell| cell.display())
                    .unwrap_or_default(),
            );
        }
        grid.push(out);
    }
    grid
}
