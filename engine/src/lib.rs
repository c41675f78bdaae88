//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the spreadsheet document engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod calc;
pub mod cell;
pub mod coord;
pub mod projection;
pub mod sheet;
pub mod style;

// Re-export commonly used types at the crate root
pub use calc::{CalcCell, CalcSheet, CalcWorkbook};
pub use cell::{parse_cell_input, Cell, CellInput, CellKind, CellValue, RichCell};
pub use coord::{col_to_index, coord_to_a1, index_to_col, parse_a1, CellCoord};
pub use projection::project;
pub use sheet::{
    empty_grid, Sheet, SheetConfig, Workbook, DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT,
};
pub use style::{
    normalize_color, AlignmentPayload, Color, ColorRef, FontPayload, StylePayload, TextAlign,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_cells() {
        let cell = Cell::new_number(42.0);
        assert_eq!(cell.value(), &CellValue::Number(42.0));
    }

    #[test]
    fn it_builds_blank_workbooks() {
        let workbook = Workbook::blank();
        assert_eq!(workbook.sheets.len(), 1);
        assert_eq!(workbook.sheets[0].name, "Sheet1");
        assert_eq!(workbook.sheets[0].data.len(), DEFAULT_ROW_COUNT);
    }

    #[test]
    fn integration_test_edit_then_project() {
        let mut workbook = Workbook::blank();
        workbook.sheets[0]
            .cell_mut(0, 0)
            .commit_value(CellValue::Number(3.0));
        workbook.sheets[0]
            .cell_mut(1, 0)
            .commit_value(CellValue::Number(4.0));
        workbook.sheets[0].cell_mut(2, 0).commit_formula("A1+A2");

        let grid = project(&workbook, 0);
        assert_eq!(grid[2][0], "7");
    }
}
