//! FILENAME: document/src/io.rs
//! PURPOSE: Open, save and export for a document session.
//! CONTEXT: Save and export both flush synchronously into the workbook
//! before producing output, so the in-memory state is the single source of
//! truth regardless of whether the caller's asynchronous write succeeds.

use serde_json::Value;

use persistence::{
    edited_data_json, export_xlsx, reconcile, DocumentRecord, PersistenceError,
};

use crate::state::DocumentSession;

impl DocumentSession {
    /// Open a document: reconcile its stored edits (any of the historical
    /// shapes, or nothing) with the optional raw file bytes. Never fails —
    /// the worst outcome is a blank sheet plus a notice.
    pub fn open(record: &DocumentRecord, raw_bytes: Option<&[u8]>) -> Self {
        let reconciled = reconcile(record.edited_data.as_ref(), raw_bytes);
        log::debug!(
            "opened document {} from {:?}",
            record.id,
            reconciled.source
        );
        Self::from_reconciled(reconciled)
    }

    /// Flush and serialize the workbook to the persisted `{ sheets }` form.
    /// Clears the modified flag; the caller owns the actual write.
    pub fn save(&mut self) -> Result<Value, PersistenceError> {
        self.flush();
        let value = edited_data_json(&self.workbook)?;
        self.modified = false;
        Ok(value)
    }

    /// Save directly into a document record's `editedData`.
    pub fn save_into(&mut self, record: &mut DocumentRecord) -> Result<(), PersistenceError> {
        record.edited_data = Some(self.save()?);
        Ok(())
    }

    /// Flush and rebuild a standalone interchange document from the sheet
    /// data. Carries cell values and formulas only: the live style overlay
    /// and imported styles are not exported on this path.
    pub fn export(&mut self) -> Result<Vec<u8>, PersistenceError> {
        self.flush();
        export_xlsx(&self.workbook)
    }
}
