//! FILENAME: document/src/state.rs
//! PURPOSE: UI-agnostic session state for one open document.
//! CONTEXT: The session owns the canonical workbook, the active-sheet
//! pointer, the live edit surface (edits land here and are only committed to
//! the workbook at a flush point), the ephemeral style-override side-table,
//! and the selection. It is created once per opened document and replaced
//! wholesale when a different document is opened.

use std::collections::HashMap;

use engine::{project, Cell, Workbook};
use persistence::{Reconciled, WorkbookSource};

use crate::api_types::{Selection, SheetInfo, SheetsResult};
use crate::overlay::{resolve_style, ResolvedStyle, StyleOverride};

/// Session state for one open document.
pub struct DocumentSession {
    pub(crate) workbook: Workbook,
    pub(crate) active_sheet: usize,
    /// Live edit surface: a working copy of the active sheet's rows.
    pub(crate) live_data: Vec<Vec<Cell>>,
    /// Ephemeral formatting side-table keyed by (sheet index, row, col).
    pub(crate) style_overrides: HashMap<(usize, usize, usize), StyleOverride>,
    pub(crate) selection: Option<Selection>,
    /// Last selection acted on; compared to suppress duplicate events.
    pub(crate) previous_selection: Option<Selection>,
    pub(crate) source: WorkbookSource,
    pub(crate) notice: Option<String>,
    pub(crate) modified: bool,
}

impl DocumentSession {
    /// A session over a blank single-sheet workbook.
    pub fn new() -> Self {
        Self::from_workbook(Workbook::blank(), WorkbookSource::Blank, None)
    }

    /// A session over a reconciled workbook (see `DocumentSession::open`).
    pub fn from_reconciled(reconciled: Reconciled) -> Self {
        Self::from_workbook(reconciled.workbook, reconciled.source, reconciled.notice)
    }

    fn from_workbook(
        mut workbook: Workbook,
        source: WorkbookSource,
        notice: Option<String>,
    ) -> Self {
        workbook.normalize();
        let live_data = workbook
            .sheet(0)
            .map(|s| s.data.clone())
            .unwrap_or_default();
        DocumentSession {
            workbook,
            active_sheet: 0,
            live_data,
            style_overrides: HashMap::new(),
            selection: None,
            previous_selection: None,
            source,
            notice,
            modified: false,
        }
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Where reconciliation sourced the workbook from.
    pub fn source(&self) -> WorkbookSource {
        self.source
    }

    /// Non-fatal notice from reconciliation, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Sheet metadata for the widget's tab strip.
    pub fn sheets_result(&self) -> SheetsResult {
        SheetsResult {
            sheets: self
                .workbook
                .sheets
                .iter()
                .map(|sheet| SheetInfo {
                    index: sheet.index,
                    name: sheet.name.clone(),
                })
                .collect(),
            active_index: self.active_sheet,
        }
    }

    /// The display grid for the active sheet, derived from the canonical
    /// workbook (the live surface joins it at the next flush point).
    pub fn display_grid(&self) -> Vec<Vec<String>> {
        project(&self.workbook, self.active_sheet)
    }

    /// Final presentation attributes for one cell of the active sheet.
    /// Recomputed per call; live overrides change independently of cells.
    pub fn resolved_style(&self, row: usize, col: usize) -> ResolvedStyle {
        let live = self
            .style_overrides
            .get(&(self.active_sheet, row, col));
        let original = self
            .live_data
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(Cell::style);
        resolve_style(live, original)
    }

    /// Apply (or merge) a live formatting override for one cell of the
    /// active sheet. Ephemeral: never persisted, never written to the cell.
    pub fn set_style_override(&mut self, row: usize, col: usize, patch: StyleOverride) {
        let entry = self
            .style_overrides
            .entry((self.active_sheet, row, col))
            .or_default();
        if patch.bg_color.is_some() {
            entry.bg_color = patch.bg_color;
        }
        if patch.text_color.is_some() {
            entry.text_color = patch.text_color;
        }
        if patch.bold.is_some() {
            entry.bold = patch.bold;
        }
        if patch.italic.is_some() {
            entry.italic = patch.italic;
        }
        if patch.align.is_some() {
            entry.align = patch.align;
        }
    }

    pub(crate) fn rebuild_live_surface(&mut self) {
        self.live_data = self
            .workbook
            .sheet(self.active_sheet)
            .map(|s| s.data.clone())
            .unwrap_or_default();
    }
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new()
    }
}
