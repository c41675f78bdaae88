//! FILENAME: document/src/overlay.rs
//! PURPOSE: Read-time merge of live formatting over imported cell styles.
//! CONTEXT: Live overrides are session state the user applied through the
//! toolbar; imported styles rode in on the cell from the original file. The
//! resolver is a pure projection consulted once per rendered cell — it never
//! mutates the cell, because live meta changes independently of it.

use serde::{Deserialize, Serialize};

use engine::style::{normalize_color, StylePayload, TextAlign};

/// One entry of the live formatting side-table, keyed elsewhere by
/// (sheet index, row, col). Every field is optional; unset fields defer to
/// the imported style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StyleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
}

impl StyleOverride {
    pub fn is_empty(&self) -> bool {
        self.bg_color.is_none()
            && self.text_color.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.align.is_none()
    }
}

/// Final per-cell presentation attributes handed to the grid widget's
/// renderer. Absent colors mean "inherit the default cell appearance".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
}

/// Merge the three formatting layers. Precedence, highest to lowest: live
/// override, imported style payload, nothing.
pub fn resolve_style(
    live: Option<&StyleOverride>,
    original: Option<&StylePayload>,
) -> ResolvedStyle {
    let mut resolved = ResolvedStyle::default();

    if let Some(style) = original {
        resolved.background_color = style.background_css();
        resolved.text_color = style.text_css();
        resolved.bold = style.bold();
        resolved.italic = style.italic();
        resolved.align = style.align();
    }

    if let Some(live) = live {
        if let Some(bg) = &live.bg_color {
            resolved.background_color = Some(passthrough_color(bg));
        }
        if let Some(color) = &live.text_color {
            resolved.text_color = Some(passthrough_color(color));
        }
        if let Some(bold) = live.bold {
            resolved.bold = bold;
        }
        if let Some(italic) = live.italic {
            resolved.italic = italic;
        }
        if live.align.is_some() {
            resolved.align = live.align;
        }
    }

    resolved
}

/// Hex encodings are normalized; anything else (named CSS colors from the
/// toolbar) passes through verbatim.
fn passthrough_color(raw: &str) -> String {
    normalize_color(raw).unwrap_or_else(|| raw.to_string())
}
