//! FILENAME: persistence/src/xlsx_reader.rs
//! PURPOSE: Decodes raw interchange bytes into model sheets via calamine.
//! CONTEXT: This is the single point where the external decoder's output
//! enters the model. The decoder exposes values, formulas and types; it has
//! no formatted-text or style surface, so decoded cells carry neither — those
//! fields only flow in from previously persisted rich cells.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use engine::{Cell, CellKind, CellValue, RichCell, Sheet};

use crate::error::PersistenceError;

/// Decode an interchange document from a file on disk.
pub fn load_xlsx(path: &Path) -> Result<Vec<Sheet>, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    read_sheets(&mut workbook)
}

/// Decode an interchange document from raw bytes.
pub fn load_xlsx_bytes(bytes: &[u8]) -> Result<Vec<Sheet>, PersistenceError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    read_sheets(&mut workbook)
}

fn read_sheets<RS: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<RS>,
) -> Result<Vec<Sheet>, PersistenceError> {
    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let mut sheets = Vec::new();

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;
        let formulas = workbook.worksheet_formula(sheet_name).ok();

        let mut sheet = Sheet {
            name: sheet_name.clone(),
            index: 0,
            data: Vec::new(),
            config: None,
        };

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row_off, row) in range.rows().enumerate() {
            for (col_off, data) in row.iter().enumerate() {
                let abs_row = start_row + row_off as u32;
                let abs_col = start_col + col_off as u32;

                let formula = formulas
                    .as_ref()
                    .and_then(|f| f.get_value((abs_row, abs_col)))
                    .filter(|f| !f.is_empty())
                    .cloned();

                let (value, kind) = match data {
                    Data::Empty => (CellValue::Empty, None),
                    Data::String(s) => (CellValue::Text(s.clone()), Some(CellKind::Text)),
                    Data::Float(f) => (CellValue::Number(*f), Some(CellKind::Number)),
                    Data::Int(i) => (CellValue::Number(*i as f64), Some(CellKind::Number)),
                    Data::Bool(b) => (CellValue::Boolean(*b), Some(CellKind::Boolean)),
                    Data::Error(e) => (
                        CellValue::Text(format!("#{:?}", e)),
                        Some(CellKind::Error),
                    ),
                    Data::DateTime(dt) => {
                        (CellValue::Number(dt.as_f64()), Some(CellKind::Date))
                    }
                    Data::DateTimeIso(s) => {
                        (CellValue::Text(s.clone()), Some(CellKind::Date))
                    }
                    Data::DurationIso(s) => {
                        (CellValue::Text(s.clone()), Some(CellKind::Date))
                    }
                };

                if value.is_empty() && formula.is_none() {
                    continue;
                }

                *sheet.cell_mut(abs_row as usize, abs_col as usize) = Cell::Rich(RichCell {
                    value,
                    formula,
                    kind,
                    text: None,
                    style: None,
                });
            }
        }

        sheets.push(sheet);
    }

    Ok(sheets)
}
