//! FILENAME: document/src/api_types.rs
//! PURPOSE: Shared type definitions for the grid-widget boundary.
//! CONTEXT: All structs use camelCase serialization for JavaScript
//! interoperability.

use serde::{Deserialize, Serialize};

/// Information about a single sheet (sent to the widget's tab strip).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    pub index: usize,
    pub name: String,
}

/// Sheet metadata plus the active tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsResult {
    pub sheets: Vec<SheetInfo>,
    pub active_index: usize,
}

/// The last cell the user focused. Drives the formula bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub row: usize,
    pub col: usize,
}
