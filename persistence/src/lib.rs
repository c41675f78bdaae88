//! FILENAME: persistence/src/lib.rs
//! PURPOSE: Persistence for spreadsheet documents.
//!
//! Reconciles heterogeneous stored state into a workbook, serializes the
//! persisted form, and reads/writes interchange-format documents.

mod error;
mod record;
mod reconcile;
mod xlsx_reader;
mod xlsx_writer;

pub use error::PersistenceError;
pub use record::{edited_data_json, DocumentRecord};
pub use reconcile::{reconcile, Reconciled, WorkbookSource};
pub use xlsx_reader::{load_xlsx, load_xlsx_bytes};
pub use xlsx_writer::{export_xlsx, save_xlsx};

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{Cell, CellValue, Workbook};

    /// Export then decode in memory: the writer's output must satisfy the
    /// reader's contract with values and formulas intact.
    #[test]
    fn test_export_roundtrip_in_memory() {
        let mut workbook = Workbook::blank();
        {
            let sheet = &mut workbook.sheets[0];
            *sheet.cell_mut(0, 0) = Cell::new_number(3.0);
            *sheet.cell_mut(1, 0) = Cell::new_text("label");
            *sheet.cell_mut(2, 0) = Cell::new_boolean(true);
            *sheet.cell_mut(3, 0) = Cell::new_formula("A1*2");
        }

        let bytes = export_xlsx(&workbook).unwrap();
        let sheets = load_xlsx_bytes(&bytes).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Sheet1");

        let decoded = &sheets[0];
        assert_eq!(decoded.cell(0, 0).unwrap().value(), &CellValue::Number(3.0));
        assert_eq!(
            decoded.cell(1, 0).unwrap().value(),
            &CellValue::Text("label".to_string())
        );
        assert_eq!(
            decoded.cell(2, 0).unwrap().value(),
            &CellValue::Boolean(true)
        );
        assert_eq!(decoded.cell(3, 0).unwrap().formula(), Some("A1*2"));
    }

    #[test]
    fn test_export_multiple_sheets_preserves_order() {
        let mut workbook = Workbook::blank();
        workbook.sheets[0].name = "First".to_string();
        workbook.sheets.push(engine::Sheet::blank("Second", 2, 2));
        workbook.normalize();
        *workbook.sheets[1].cell_mut(0, 0) = Cell::new_number(9.0);

        let bytes = export_xlsx(&workbook).unwrap();
        let sheets = load_xlsx_bytes(&bytes).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "First");
        assert_eq!(sheets[1].name, "Second");
        assert_eq!(sheets[1].cell(0, 0).unwrap().value(), &CellValue::Number(9.0));
    }

    #[test]
    fn test_save_and_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut workbook = Workbook::blank();
        *workbook.sheets[0].cell_mut(0, 1) = Cell::new_text("hello");
        save_xlsx(&workbook, &path).unwrap();

        let sheets = load_xlsx(&path).unwrap();
        assert_eq!(
            sheets[0].cell(0, 1).unwrap().value(),
            &CellValue::Text("hello".to_string())
        );
    }

    #[test]
    fn test_invalid_bytes_error() {
        assert!(load_xlsx_bytes(b"garbage").is_err());
    }
}
