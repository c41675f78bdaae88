//! FILENAME: persistence/src/xlsx_writer.rs
//! PURPOSE: Builds a standalone interchange document from workbook data.
//! CONTEXT: This path carries cell values and formulas only — neither the
//! live style overlay nor imported style payloads are written. Widening the
//! export surface is tracked as an open product decision, not silently done.

use std::path::Path;

use rust_xlsxwriter::Workbook as XlsxWorkbook;

use engine::{CellValue, Workbook};

use crate::error::PersistenceError;

/// Export to an in-memory interchange document.
pub fn export_xlsx(workbook: &Workbook) -> Result<Vec<u8>, PersistenceError> {
    let mut xlsx = build_document(workbook)?;
    Ok(xlsx.save_to_buffer()?)
}

/// Export to a file on disk.
pub fn save_xlsx(workbook: &Workbook, path: &Path) -> Result<(), PersistenceError> {
    let mut xlsx = build_document(workbook)?;
    xlsx.save(path)?;
    Ok(())
}

fn build_document(workbook: &Workbook) -> Result<XlsxWorkbook, PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();

    for sheet in &workbook.sheets {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (r, row) in sheet.data.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let row_idx = r as u32;
                let col_idx = c as u16;

                if let Some(formula) = cell.formula() {
                    let clean_formula = formula.strip_prefix('=').unwrap_or(formula);
                    worksheet.write_formula(row_idx, col_idx, clean_formula)?;
                    continue;
                }

                match cell.value() {
                    CellValue::Empty => {}
                    CellValue::Number(n) => {
                        worksheet.write_number(row_idx, col_idx, *n)?;
                    }
                    CellValue::Text(s) => {
                        worksheet.write_string(row_idx, col_idx, s)?;
                    }
                    CellValue::Boolean(b) => {
                        worksheet.write_boolean(row_idx, col_idx, *b)?;
                    }
                }
            }
        }
    }

    Ok(xlsx)
}
