//! FILENAME: tests/test_lifecycle.rs
//! Integration tests for the sheet lifecycle: flush-before-switch, edit
//! round-trips through projection, and the style overlay.

use document::{DocumentSession, StyleOverride};
use engine::CellValue;

// ============================================================================
// FLUSH-BEFORE-SWITCH
// ============================================================================

#[test]
fn test_edits_survive_switching_away_and_back() {
    let mut session = DocumentSession::new();
    session.add_sheet(); // Sheet2
    session.switch_sheet(0).unwrap();

    session.edit_cell(0, 0, "hello");
    session.switch_sheet(1).unwrap();
    session.switch_sheet(0).unwrap();

    assert_eq!(session.display_grid()[0][0], "hello");
}

#[test]
fn test_edits_on_both_sheets_stay_separate() {
    let mut session = DocumentSession::new();
    session.add_sheet();

    session.edit_cell(0, 0, "second");
    session.switch_sheet(0).unwrap();
    session.edit_cell(0, 0, "first");
    session.switch_sheet(1).unwrap();

    assert_eq!(session.display_grid()[0][0], "second");
    session.switch_sheet(0).unwrap();
    assert_eq!(session.display_grid()[0][0], "first");
}

// ============================================================================
// EDIT / PROJECT ROUND-TRIP
// ============================================================================

#[test]
fn test_value_edit_roundtrip() {
    let mut session = DocumentSession::new();
    session.edit_cell(2, 3, "12.5");
    session.flush();
    assert_eq!(session.display_grid()[2][3], "12.5");
}

#[test]
fn test_formula_projects_evaluated_result_not_input() {
    let mut session = DocumentSession::new();
    session.edit_cell(0, 0, "3");
    session.edit_cell(1, 0, "4");
    session.edit_from_formula_bar(2, 0, "=A1+A2");
    session.flush();

    let grid = session.display_grid();
    assert_eq!(grid[2][0], "7");

    // The formula bar still edits the formula, not the computed result.
    session.select(2, 0);
    assert_eq!(session.formula_bar_content(), "=A1+A2");
}

#[test]
fn test_cross_sheet_formula() {
    let mut session = DocumentSession::new();
    session.add_sheet(); // Sheet2, now active
    session.edit_cell(0, 0, "41");
    session.switch_sheet(0).unwrap();
    session.edit_cell(0, 0, "=Sheet2!A1+1");
    session.flush();
    assert_eq!(session.display_grid()[0][0], "42");
}

#[test]
fn test_selection_resets_on_sheet_switch() {
    let mut session = DocumentSession::new();
    session.add_sheet();
    session.switch_sheet(0).unwrap();
    session.select(3, 3);
    assert!(session.selection().is_some());

    session.switch_sheet(1).unwrap();
    assert!(session.selection().is_none());
    assert_eq!(session.formula_bar_content(), "");
}

// ============================================================================
// STYLE OVERLAY
// ============================================================================

#[test]
fn test_live_override_beats_imported_style() {
    use persistence::DocumentRecord;

    let record = DocumentRecord {
        id: "doc".to_string(),
        file_name: "styled.xlsx".to_string(),
        file_type: "xlsx".to_string(),
        raw_file_ref: None,
        edited_data: Some(serde_json::json!({
            "sheets": [{
                "name": "Sheet1",
                "data": [[{"v": 1, "s": {"fgColor": {"rgb": "FFFF0000"}}}]]
            }]
        })),
    };
    let mut session = DocumentSession::open(&record, None);

    // Imported style alone.
    assert_eq!(
        session.resolved_style(0, 0).background_color.as_deref(),
        Some("#ff0000")
    );

    // Live override wins.
    session.set_style_override(
        0,
        0,
        StyleOverride {
            bg_color: Some("#00ff00".to_string()),
            ..StyleOverride::default()
        },
    );
    assert_eq!(
        session.resolved_style(0, 0).background_color.as_deref(),
        Some("#00ff00")
    );

    // The cell itself was never touched.
    let cell = &session.workbook().sheets[0].data[0][0];
    assert_eq!(cell.value(), &CellValue::Number(1.0));
    assert_eq!(
        cell.style().and_then(|s| s.background_css()).as_deref(),
        Some("#ff0000")
    );
}

#[test]
fn test_overrides_are_per_sheet() {
    let mut session = DocumentSession::new();
    session.set_style_override(
        0,
        0,
        StyleOverride {
            bold: Some(true),
            ..StyleOverride::default()
        },
    );
    assert!(session.resolved_style(0, 0).bold);

    session.add_sheet();
    assert!(!session.resolved_style(0, 0).bold);
}
