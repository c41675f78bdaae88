//! FILENAME: persistence/src/reconcile.rs
//! PURPOSE: Produces a valid workbook from whatever was stored for a document.
//! CONTEXT: Stored state comes in four mutually-inconsistent shapes (multi-
//! sheet records, a legacy flat array, raw interchange bytes, or nothing).
//! Each shape has a typed parser attempt returning `Option<Workbook>`; the
//! attempts compose first-success in fixed priority order, and the blank
//! fallback guarantees a terminal state. No parse failure ever escapes.

use serde_json::Value;

use engine::{Cell, CellValue, Sheet, Workbook};

use crate::xlsx_reader;

/// Which step of the fallback chain produced the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookSource {
    /// Multi-sheet persisted format accepted as-is.
    Edited,
    /// Legacy flat-array format lifted into a single sheet.
    Legacy,
    /// Decoded from the original uploaded bytes.
    RawFile,
    /// Nothing usable; blank default sheet.
    Blank,
}

/// The outcome of reconciliation: always a valid, non-empty workbook.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub workbook: Workbook,
    pub source: WorkbookSource,
    /// Non-fatal notice for the caller (set for the blank fallback).
    pub notice: Option<String>,
}

/// Resolve a document's stored state to a workbook, trying in order: the
/// multi-sheet persisted format, the legacy tabular format, a fresh parse of
/// the raw file bytes, and finally one blank 50x26 sheet.
pub fn reconcile(edited_data: Option<&Value>, raw_bytes: Option<&[u8]>) -> Reconciled {
    let attempt = edited_data
        .and_then(parse_sheet_records)
        .map(|workbook| (workbook, WorkbookSource::Edited))
        .or_else(|| {
            edited_data
                .and_then(parse_legacy_rows)
                .map(|workbook| (workbook, WorkbookSource::Legacy))
        })
        .or_else(|| {
            raw_bytes
                .and_then(parse_raw_file)
                .map(|workbook| (workbook, WorkbookSource::RawFile))
        });

    match attempt {
        Some((workbook, source)) => Reconciled {
            workbook,
            source,
            notice: None,
        },
        None => {
            log::warn!("no stored shape was usable; falling back to a blank sheet");
            Reconciled {
                workbook: Workbook::blank(),
                source: WorkbookSource::Blank,
                notice: Some(
                    "The document's saved data could not be read; opened a blank sheet."
                        .to_string(),
                ),
            }
        }
    }
}

/// Attempt 1: `{ "sheets": [...] }` with Sheet-shaped records.
fn parse_sheet_records(value: &Value) -> Option<Workbook> {
    let sheets = value.get("sheets")?.as_array()?;
    if sheets.is_empty() {
        return None;
    }
    let sheets: Vec<Sheet> = serde_json::from_value(Value::Array(sheets.clone())).ok()?;
    Some(Workbook::from_sheets(sheets))
}

/// Attempt 2: a flat non-empty array of uniform objects. Row 0 becomes the
/// header row (key order is serde_json's deterministic object order, union
/// across records); each record contributes one row of values.
fn parse_legacy_rows(value: &Value) -> Option<Workbook> {
    let records = value.as_array()?;
    if records.is_empty() {
        return None;
    }
    let objects = records
        .iter()
        .map(Value::as_object)
        .collect::<Option<Vec<_>>>()?;

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        return None;
    }

    let mut data: Vec<Vec<Cell>> = Vec::with_capacity(objects.len() + 1);
    data.push(
        headers
            .iter()
            .map(|h| Cell::new_text(h.clone()))
            .collect(),
    );
    for object in objects {
        data.push(
            headers
                .iter()
                .map(|h| Cell::Scalar(json_scalar(object.get(h))))
                .collect(),
        );
    }

    let sheet = Sheet {
        name: "Sheet1".to_string(),
        index: 0,
        data,
        config: None,
    };
    Some(Workbook::from_sheets(vec![sheet]))
}

/// Attempt 3: decode the raw interchange bytes. Decoder errors are caught
/// here and reported as a fallthrough, never propagated.
fn parse_raw_file(bytes: &[u8]) -> Option<Workbook> {
    match xlsx_reader::load_xlsx_bytes(bytes) {
        Ok(sheets) if !sheets.is_empty() => Some(Workbook::from_sheets(sheets)),
        Ok(_) => None,
        Err(err) => {
            log::warn!("raw file decode failed: {}", err);
            None
        }
    }
}

fn json_scalar(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Empty,
        Some(Value::Bool(b)) => CellValue::Boolean(*b),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => CellValue::Number(f),
            None => CellValue::Text(n.to_string()),
        },
        Some(Value::String(s)) => CellValue::Text(s.clone()),
        // Nested structures have no cell representation; keep their text.
        Some(other) => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT};
    use serde_json::json;

    #[test]
    fn test_sheets_blob_is_accepted_and_normalized() {
        let blob = json!({
            "sheets": [
                {"name": "Data", "data": [["a", 1], ["b"]]},
                {"name": "Other", "data": []}
            ]
        });
        let result = reconcile(Some(&blob), None);
        assert_eq!(result.source, WorkbookSource::Edited);
        assert!(result.notice.is_none());
        let sheets = &result.workbook.sheets;
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].index, 0);
        assert_eq!(sheets[1].index, 1);
        // Rectangular after normalization.
        let config = sheets[0].config.unwrap();
        assert_eq!(config.row_count, 2);
        assert_eq!(config.column_count, 2);
        assert!(sheets[0].data.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_legacy_rows_become_header_and_values() {
        let blob = json!([
            {"Name": "A", "Val": 1},
            {"Name": "B", "Val": 2}
        ]);
        let result = reconcile(Some(&blob), None);
        assert_eq!(result.source, WorkbookSource::Legacy);
        let sheet = &result.workbook.sheets[0];
        assert_eq!(sheet.name, "Sheet1");
        assert_eq!(sheet.data[0][0], Cell::new_text("Name"));
        assert_eq!(sheet.data[0][1], Cell::new_text("Val"));
        assert_eq!(sheet.data[1][0], Cell::new_text("A"));
        assert_eq!(sheet.data[1][1], Cell::new_number(1.0));
        assert_eq!(sheet.data[2][0], Cell::new_text("B"));
        assert_eq!(sheet.data[2][1], Cell::new_number(2.0));
    }

    #[test]
    fn test_legacy_rows_with_missing_keys() {
        let blob = json!([
            {"Name": "A"},
            {"Name": "B", "Extra": true}
        ]);
        let result = reconcile(Some(&blob), None);
        assert_eq!(result.source, WorkbookSource::Legacy);
        let sheet = &result.workbook.sheets[0];
        assert_eq!(sheet.data[1][1], Cell::empty());
        assert_eq!(sheet.data[2][1], Cell::new_boolean(true));
    }

    #[test]
    fn test_empty_fallback() {
        let result = reconcile(None, None);
        assert_eq!(result.source, WorkbookSource::Blank);
        assert!(result.notice.is_some());
        let sheet = &result.workbook.sheets[0];
        assert_eq!(sheet.data.len(), DEFAULT_ROW_COUNT);
        assert!(sheet.data.iter().all(|row| row.len() == DEFAULT_COLUMN_COUNT));
        assert!(sheet.data.iter().flatten().all(Cell::is_empty));
    }

    #[test]
    fn test_malformed_shapes_fall_through() {
        // sheets present but not sheet-shaped, and not a legacy array either
        let blob = json!({"sheets": "oops"});
        assert_eq!(reconcile(Some(&blob), None).source, WorkbookSource::Blank);

        let blob = json!({"sheets": [{"data": []}]}); // missing name
        assert_eq!(reconcile(Some(&blob), None).source, WorkbookSource::Blank);

        let blob = json!(42);
        assert_eq!(reconcile(Some(&blob), None).source, WorkbookSource::Blank);

        let blob = json!(["not", "objects"]);
        assert_eq!(reconcile(Some(&blob), None).source, WorkbookSource::Blank);
    }

    #[test]
    fn test_garbage_raw_bytes_fall_through_to_blank() {
        let result = reconcile(None, Some(b"this is not a zip archive"));
        assert_eq!(result.source, WorkbookSource::Blank);
        assert!(result.notice.is_some());
    }

    #[test]
    fn test_sheets_shape_wins_over_legacy() {
        // An object with a sheets key is never treated as legacy rows.
        let blob = json!({"sheets": [{"name": "S", "data": [[1]]}]});
        assert_eq!(reconcile(Some(&blob), None).source, WorkbookSource::Edited);
    }

    #[test]
    fn test_rich_cells_survive_reconciliation() {
        let blob = json!({
            "sheets": [{
                "name": "S",
                "data": [[{"v": 10, "f": "A2*2", "w": "10.00"}]]
            }]
        });
        let result = reconcile(Some(&blob), None);
        let cell = &result.workbook.sheets[0].data[0][0];
        assert_eq!(cell.formula(), Some("A2*2"));
        assert_eq!(cell.cached_text(), Some("10.00"));
    }
}
