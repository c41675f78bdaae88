//! FILENAME: engine/src/cell.rs
//! PURPOSE: Defines the fundamental data structures for a single spreadsheet cell.
//! CONTEXT: A cell is either a bare scalar or a rich record that additionally
//! carries a formula, a value-type tag, cached display text and a style payload
//! recovered from the original file. Persisted grids mix both shapes freely, so
//! both (de)serialize untagged.

use serde::{Deserialize, Serialize};

use crate::style::StylePayload;

/// The raw data held by a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    /// Serialized as JSON `null`.
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns the display text of the value as a String.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => {
                if *b { "TRUE" } else { "FALSE" }.to_string()
            }
        }
    }

}

/// Value-type tag carried by the interchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    #[serde(rename = "n")]
    Number,
    #[serde(rename = "s")]
    Text,
    #[serde(rename = "b")]
    Boolean,
    #[serde(rename = "d")]
    Date,
    #[serde(rename = "e")]
    Error,
    #[serde(rename = "z")]
    Blank,
}

/// A cell that carries more than a bare value. Field names follow the
/// interchange format's wire keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RichCell {
    /// Raw value. When a formula is present this is only the last-known
    /// cached result and is stale relative to the formula.
    #[serde(rename = "v", default, skip_serializing_if = "CellValue::is_empty")]
    pub value: CellValue,
    /// Formula text, stored without the leading `=` marker.
    #[serde(rename = "f", default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Value-type tag from the source file.
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CellKind>,
    /// Formatted display text cached from the source file.
    #[serde(rename = "w", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Style payload carried from the original interchange format.
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StylePayload>,
}

/// The atomic unit of the spreadsheet: either a scalar or a rich record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Rich(RichCell),
    Scalar(CellValue),
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Scalar(CellValue::Empty)
    }
}

impl Cell {
    pub fn empty() -> Self {
        Cell::default()
    }

    pub fn new_number(num: f64) -> Self {
        Cell::Scalar(CellValue::Number(num))
    }

    pub fn new_text(text: impl Into<String>) -> Self {
        Cell::Scalar(CellValue::Text(text.into()))
    }

    pub fn new_boolean(value: bool) -> Self {
        Cell::Scalar(CellValue::Boolean(value))
    }

    /// A formula cell with no cached value yet. `formula` is stored without
    /// the leading `=` marker.
    pub fn new_formula(formula: impl Into<String>) -> Self {
        Cell::Rich(RichCell {
            formula: Some(formula.into()),
            ..RichCell::default()
        })
    }

    pub fn value(&self) -> &CellValue {
        match self {
            Cell::Rich(rich) => &rich.value,
            Cell::Scalar(value) => value,
        }
    }

    pub fn formula(&self) -> Option<&str> {
        match self {
            Cell::Rich(rich) => rich.formula.as_deref(),
            Cell::Scalar(_) => None,
        }
    }

    pub fn cached_text(&self) -> Option<&str> {
        match self {
            Cell::Rich(rich) => rich.text.as_deref(),
            Cell::Scalar(_) => None,
        }
    }

    pub fn style(&self) -> Option<&StylePayload> {
        match self {
            Cell::Rich(rich) => rich.style.as_ref(),
            Cell::Scalar(_) => None,
        }
    }

    /// A cell is empty when it has no value, no formula and no cached text.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Scalar(value) => value.is_empty(),
            Cell::Rich(rich) => {
                rich.value.is_empty() && rich.formula.is_none() && rich.text.is_none()
            }
        }
    }

    /// Commit a plain value edit. Replaces any formula and invalidates the
    /// cached display text; the style payload survives the edit.
    pub fn commit_value(&mut self, value: CellValue) {
        match self {
            Cell::Scalar(_) => *self = Cell::Scalar(value),
            Cell::Rich(rich) => {
                if rich.style.is_none() {
                    *self = Cell::Scalar(value);
                } else {
                    rich.value = value;
                    rich.formula = None;
                    rich.text = None;
                    rich.kind = None;
                }
            }
        }
    }

    /// Commit a formula edit. The previous value is kept as the stale cache
    /// until the next evaluation; cached display text is invalidated.
    pub fn commit_formula(&mut self, formula: impl Into<String>) {
        let formula = formula.into();
        match self {
            Cell::Scalar(value) => {
                *self = Cell::Rich(RichCell {
                    value: value.clone(),
                    formula: Some(formula),
                    ..RichCell::default()
                });
            }
            Cell::Rich(rich) => {
                rich.formula = Some(formula);
                rich.text = None;
                rich.kind = None;
            }
        }
    }
}

/// Classification of raw text typed into a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellInput {
    /// Leading `=`; the formula body without the marker.
    Formula(String),
    Value(CellValue),
}

/// Classify user input the way the edit surface does: leading `=` is a
/// formula, `TRUE`/`FALSE` are booleans, numeric text (including a `%`
/// suffix and `,` thousands separators) is a number, anything else is text.
pub fn parse_cell_input(input: &str) -> CellInput {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return CellInput::Value(CellValue::Empty);
    }
    if let Some(body) = trimmed.strip_prefix('=') {
        return CellInput::Formula(body.to_string());
    }
    let upper = trimmed.to_uppercase();
    if upper == "TRUE" {
        return CellInput::Value(CellValue::Boolean(true));
    }
    if upper == "FALSE" {
        return CellInput::Value(CellValue::Boolean(false));
    }
    if let Some(num) = parse_number(trimmed) {
        return CellInput::Value(CellValue::Number(num));
    }
    CellInput::Value(CellValue::Text(trimmed.to_string()))
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.ends_with('%') {
        let num_part = trimmed.trim_end_matches('%').trim();
        if let Ok(n) = num_part.parse::<f64>() {
            return Some(n / 100.0);
        }
        return None;
    }
    let cleaned = trimmed.replace(',', "");
    if let Ok(n) = cleaned.parse::<f64>() {
        if n.is_finite() {
            return Some(n);
        }
    }
    None
}
