//! FILENAME: persistence/src/record.rs
//! PURPOSE: The persisted document envelope and the save-side serializer.
//! CONTEXT: `editedData` is deliberately left free-form on the way in — over
//! the document's lifetime it has held null, a legacy flat array, and the
//! multi-sheet record — and reconciliation sorts that out. On the way out
//! only the `{ sheets: [...] }` shape is ever written.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use engine::Workbook;

use crate::error::PersistenceError;

/// The stored record for one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    /// Reference to the original uploaded bytes, when still available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_file_ref: Option<String>,
    /// Heterogeneous stored edits; see reconciliation.
    #[serde(default)]
    pub edited_data: Option<Value>,
}

impl DocumentRecord {
    /// Replace the stored edits with the workbook's persisted form.
    pub fn set_edited_data(&mut self, workbook: &Workbook) -> Result<(), PersistenceError> {
        self.edited_data = Some(edited_data_json(workbook)?);
        Ok(())
    }
}

/// Serialize a workbook to the persisted `{ sheets: [...] }` form. Sheets
/// are normalized first so ragged intermediate states never reach storage.
pub fn edited_data_json(workbook: &Workbook) -> Result<Value, PersistenceError> {
    let mut normalized = workbook.clone();
    normalized.normalize();
    Ok(serde_json::json!({
        "sheets": serde_json::to_value(&normalized.sheets)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{CellValue, Workbook};

    #[test]
    fn test_edited_data_shape() {
        let mut workbook = Workbook::blank();
        workbook.sheets[0]
            .cell_mut(0, 0)
            .commit_value(CellValue::Text("hi".to_string()));
        let value = edited_data_json(&workbook).unwrap();
        let sheets = value.get("sheets").and_then(Value::as_array).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0]["name"], "Sheet1");
        assert_eq!(sheets[0]["data"][0][0], "hi");
        assert_eq!(sheets[0]["config"]["rowCount"], 50);
        assert_eq!(sheets[0]["config"]["columnCount"], 26);
    }

    #[test]
    fn test_record_roundtrip() {
        let json = r#"{
            "id": "doc-1",
            "fileName": "report.xlsx",
            "fileType": "xlsx",
            "rawFileRef": "blob/123",
            "editedData": null
        }"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.file_name, "report.xlsx");
        assert_eq!(record.raw_file_ref.as_deref(), Some("blob/123"));
        assert!(record.edited_data.is_none());
    }

    #[test]
    fn test_set_edited_data_writes_sheets_shape_only() {
        let mut record = DocumentRecord {
            id: "doc-1".to_string(),
            file_name: "f.csv".to_string(),
            file_type: "csv".to_string(),
            raw_file_ref: None,
            edited_data: Some(serde_json::json!([{"Name": "A"}])),
        };
        record.set_edited_data(&Workbook::blank()).unwrap();
        let data = record.edited_data.unwrap();
        assert!(data.get("sheets").is_some());
        assert!(!data.is_array());
    }
}
