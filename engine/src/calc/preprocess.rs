//! FILENAME: engine/src/calc/preprocess.rs
//! PURPOSE: Rewrites formula text into scripts the Rhai engine can run.
//! CONTEXT: Cell references like `A1`, `Sheet2!B3` or `'My Sheet'!B3` become
//! `CELL(...)` calls, and aggregate range calls like `SUM(A1:B5)` become
//! `SUM_RANGE(...)` calls. Rewritten fragments and string literals are held
//! behind placeholders while the remaining passes run, so reference-looking
//! text inside them is never rewritten twice.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::coord::col_to_index;

/// Aggregate builtins understood at the engine boundary. Anything else the
/// engine cannot run is an evaluation failure handled by the caller.
pub const RANGE_BUILTINS: &[&str] = &["SUM", "AVERAGE", "MIN", "MAX", "COUNT"];

/// A reference discovered while rewriting a formula. Used for dependency
/// ordering; coordinates are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    Cell {
        sheet: String,
        row: u32,
        col: u32,
    },
    Range {
        sheet: String,
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    },
}

/// The result of preprocessing one formula body.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub script: String,
    pub refs: Vec<RefTarget>,
}

static RANGE_FN_RE: Lazy<Regex> = Lazy::new(|| {
    let names = RANGE_BUILTINS.join("|");
    Regex::new(&format!(
        r"\b({})\s*\(\s*(?:'([^']+)'!|([A-Za-z_][A-Za-z0-9_]*)!)?([A-Za-z]{{1,3}})([0-9]+)\s*:\s*([A-Za-z]{{1,3}})([0-9]+)\s*\)",
        names
    ))
    .expect("range builtin regex must compile")
});

static SHEET_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:'([^']+)'|([A-Za-z_][A-Za-z0-9_]*))!([A-Za-z]{1,3})([0-9]+)")
        .expect("sheet reference regex must compile")
});

static CELL_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]{1,3})([0-9]+)\b").expect("cell reference regex must compile")
});

static TRUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bTRUE\b").expect("literal regex must compile"));
static FALSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bFALSE\b").expect("literal regex must compile"));

fn placeholder(idx: usize) -> String {
    format!("@@@{}@@@", idx)
}

fn row_index(digits: &str) -> u32 {
    digits.parse::<u32>().unwrap_or(u32::MAX).saturating_sub(1)
}

/// Rewrite a formula body (without the `=` marker) for the given sheet.
pub fn preprocess_formula(body: &str, current_sheet: &str) -> Preprocessed {
    let mut refs: Vec<RefTarget> = Vec::new();
    let mut replacements: Vec<String> = Vec::new();

    // String literals are carried through untouched.
    let mut script = String::with_capacity(body.len());
    let mut literal = String::new();
    let mut in_string = false;
    for ch in body.chars() {
        if in_string {
            literal.push(ch);
            if ch == '"' {
                in_string = false;
                script.push_str(&placeholder(replacements.len()));
                replacements.push(std::mem::take(&mut literal));
            }
        } else if ch == '"' {
            in_string = true;
            literal.push(ch);
        } else {
            script.push(ch);
        }
    }
    if !literal.is_empty() {
        // Unterminated literal; preserve it and let the engine report it.
        script.push_str(&placeholder(replacements.len()));
        replacements.push(literal);
    }

    // Absolute-reference markers are display-only.
    let script = script.replace('$', "");

    // Aggregate range calls.
    let script = RANGE_FN_RE
        .replace_all(&script, |caps: &regex::Captures| {
            let func = &caps[1];
            let sheet = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or(current_sheet);
            let (c1, r1) = (col_to_index(&caps[4]), row_index(&caps[5]));
            let (c2, r2) = (col_to_index(&caps[6]), row_index(&caps[7]));
            refs.push(RefTarget::Range {
                sheet: sheet.to_string(),
                start_row: r1.min(r2),
                start_col: c1.min(c2),
                end_row: r1.max(r2),
                end_col: c1.max(c2),
            });
            let idx = replacements.len();
            replacements.push(format!(
                "{}_RANGE({:?}, {}, {}, {}, {})",
                func, sheet, c1, r1, c2, r2
            ));
            placeholder(idx)
        })
        .to_string();

    // Cross-sheet single references.
    let script = SHEET_REF_RE
        .replace_all(&script, |caps: &regex::Captures| {
            let sheet = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or(current_sheet);
            let col = col_to_index(&caps[3]);
            let row = row_index(&caps[4]);
            refs.push(RefTarget::Cell {
                sheet: sheet.to_string(),
                row,
                col,
            });
            let idx = replacements.len();
            replacements.push(format!("CELL({:?}, {}, {})", sheet, col, row));
            placeholder(idx)
        })
        .to_string();

    // Bare references resolve against the formula's own sheet.
    let script = CELL_REF_RE
        .replace_all(&script, |caps: &regex::Captures| {
            let col = col_to_index(&caps[1]);
            let row = row_index(&caps[2]);
            refs.push(RefTarget::Cell {
                sheet: current_sheet.to_string(),
                row,
                col,
            });
            let idx = replacements.len();
            replacements.push(format!("CELL({:?}, {}, {})", current_sheet, col, row));
            placeholder(idx)
        })
        .to_string();

    // Operator and literal spellings the engine does not share.
    let script = script.replace("<>", "!=").replace('^', "**");
    let script = TRUE_RE.replace_all(&script, "true").to_string();
    let mut script = FALSE_RE.replace_all(&script, "false").to_string();

    for (idx, replacement) in replacements.iter().enumerate() {
        script = script.replace(&placeholder(idx), replacement);
    }

    Preprocessed { script, refs }
}
