//! FILENAME: document/src/ops.rs
//! PURPOSE: Sheet lifecycle operations and cell-mutation entry points.
//! CONTEXT: Edits write into the live surface; the surface is committed into
//! the workbook at a flush point (switch, save, export). Switching sheets
//! flushes BEFORE the active pointer moves — edits made just before a switch
//! must never be lost. Invalid operations are rejected before any mutation.

use engine::{parse_cell_input, Cell, CellInput, Sheet, DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT};

use crate::api_types::Selection;
use crate::error::{DocumentError, Result};
use crate::state::DocumentSession;

impl DocumentSession {
    /// Commit the live surface into the active sheet's canonical data.
    pub fn flush(&mut self) {
        if let Some(sheet) = self.workbook.sheets.get_mut(self.active_sheet) {
            sheet.data = self.live_data.clone();
            sheet.normalize();
            self.live_data = sheet.data.clone();
        }
    }

    /// Switch the active sheet. Flushes the current sheet first, then
    /// repoints and rebuilds the live surface; the selection is recomputed
    /// (reset), never carried over.
    pub fn switch_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.workbook.sheets.len() {
            return Err(DocumentError::SheetIndexOutOfRange(index));
        }
        self.flush();
        self.active_sheet = index;
        self.rebuild_live_surface();
        self.selection = None;
        self.previous_selection = None;
        Ok(())
    }

    /// Grid-originated edit: write into the live surface only.
    pub fn edit_cell(&mut self, row: usize, col: usize, input: &str) {
        if self.live_data.len() <= row {
            self.live_data.resize_with(row + 1, Vec::new);
        }
        let row_vec = &mut self.live_data[row];
        if row_vec.len() <= col {
            row_vec.resize_with(col + 1, Cell::empty);
        }
        match parse_cell_input(input) {
            CellInput::Formula(body) => row_vec[col].commit_formula(body),
            CellInput::Value(value) => row_vec[col].commit_value(value),
        }
        self.modified = true;
    }

    /// Formula-bar-originated edit: same write path as the grid.
    pub fn edit_from_formula_bar(&mut self, row: usize, col: usize, input: &str) {
        self.edit_cell(row, col, input);
    }

    /// What the formula bar shows for the current selection: formula cells
    /// get their `=` marker restored so the user edits the formula, not the
    /// computed result; other cells show their raw value.
    pub fn formula_bar_content(&self) -> String {
        let Some(selection) = self.selection else {
            return String::new();
        };
        let Some(cell) = self
            .live_data
            .get(selection.row)
            .and_then(|r| r.get(selection.col))
        else {
            return String::new();
        };
        match cell.formula() {
            Some(formula) => format!("={}", formula),
            None => cell.value().display(),
        }
    }

    /// Record a selection event. Returns false when the event duplicates the
    /// previous selection and should be ignored.
    pub fn select(&mut self, row: usize, col: usize) -> bool {
        let next = Selection { row, col };
        if self.previous_selection == Some(next) {
            return false;
        }
        self.previous_selection = Some(next);
        self.selection = Some(next);
        true
    }

    /// Append a blank default-sized sheet with a generated unique name and
    /// make it active. The outgoing sheet is flushed first.
    pub fn add_sheet(&mut self) -> usize {
        self.flush();
        let name = self.workbook.unique_sheet_name();
        self.workbook
            .sheets
            .push(Sheet::blank(name, DEFAULT_ROW_COUNT, DEFAULT_COLUMN_COUNT));
        self.workbook.reindex();
        self.active_sheet = self.workbook.sheets.len() - 1;
        self.rebuild_live_surface();
        self.selection = None;
        self.previous_selection = None;
        self.modified = true;
        self.active_sheet
    }

    /// Delete a sheet. Deleting the last remaining sheet is rejected.
    /// Deleting the active sheet activates index 0; deleting a sheet before
    /// the active one decrements the pointer so it tracks the same sheet.
    pub fn delete_sheet(&mut self, index: usize) -> Result<()> {
        if self.workbook.sheets.len() <= 1 {
            return Err(DocumentError::LastSheet);
        }
        if index >= self.workbook.sheets.len() {
            return Err(DocumentError::SheetIndexOutOfRange(index));
        }

        self.flush();
        let old_active = self.active_sheet;
        self.workbook.sheets.remove(index);
        self.workbook.reindex();

        self.active_sheet = if old_active == index {
            0
        } else if index < old_active {
            old_active - 1
        } else {
            old_active
        };

        // Drop the deleted sheet's overrides and shift later sheets' keys.
        self.style_overrides = std::mem::take(&mut self.style_overrides)
            .into_iter()
            .filter(|((sheet, _, _), _)| *sheet != index)
            .map(|((sheet, row, col), value)| {
                let sheet = if sheet > index { sheet - 1 } else { sheet };
                ((sheet, row, col), value)
            })
            .collect();
        self.rebuild_live_surface();
        self.selection = None;
        self.previous_selection = None;
        self.modified = true;
        Ok(())
    }

    /// Rename a sheet. The name is trimmed and must be non-empty and unique
    /// within the workbook.
    pub fn rename_sheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.workbook.sheets.len() {
            return Err(DocumentError::SheetIndexOutOfRange(index));
        }
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(DocumentError::EmptySheetName);
        }
        if self
            .workbook
            .sheets
            .iter()
            .any(|s| s.index != index && s.name == trimmed)
        {
            return Err(DocumentError::DuplicateSheetName(trimmed.to_string()));
        }
        self.workbook.sheets[index].name = trimmed.to_string();
        self.modified = true;
        Ok(())
    }
}
