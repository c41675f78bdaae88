//! FILENAME: engine/src/style.rs
//! PURPOSE: Style data carried by cells from the original interchange format.
//! CONTEXT: The payload is deserialized defensively (every field optional,
//! unknown fields ignored) because it arrives verbatim from files written by
//! several generations of the product. Color strings come in direct 6-char
//! RGB and ARGB-prefixed 8-char encodings.

use serde::{Deserialize, Serialize};

/// Text alignment options for cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    General, // Auto: numbers right, text left
    Left,
    Center,
    Right,
}

/// RGB color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parse from a hex string in either encoding the interchange format
    /// produces: direct "#RRGGBB"/"RRGGBB", or 8-character "AARRGGBB" where
    /// the leading alpha pair is stripped.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let rgb = match hex.len() {
            6 => hex,
            8 => &hex[2..],
            _ => return None,
        };
        let r = u8::from_str_radix(&rgb[0..2], 16).ok()?;
        let g = u8::from_str_radix(&rgb[2..4], 16).ok()?;
        let b = u8::from_str_radix(&rgb[4..6], 16).ok()?;
        Some(Color::new(r, g, b))
    }

    /// Convert to a CSS hex string.
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Normalize a raw color string to CSS "#rrggbb" form, or None if it is not
/// a recognizable encoding.
pub fn normalize_color(raw: &str) -> Option<String> {
    Color::from_hex(raw).map(|c| c.to_css())
}

/// A color reference inside the style payload, e.g. `{"rgb":"FFFF0000"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColorRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,
}

impl ColorRef {
    pub fn css(&self) -> Option<String> {
        self.rgb.as_deref().and_then(normalize_color)
    }
}

/// Font attributes inside the style payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FontPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorRef>,
}

/// Alignment attributes inside the style payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AlignmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<TextAlign>,
}

/// The style record carried on a cell by the original interchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StylePayload {
    /// Pattern-fill foreground color; for solid fills this is the effective
    /// cell background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg_color: Option<ColorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<ColorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentPayload>,
}

impl StylePayload {
    /// The cell background decoded from the fill: pattern foreground first,
    /// plain background second.
    pub fn background_css(&self) -> Option<String> {
        self.fg_color
            .as_ref()
            .and_then(ColorRef::css)
            .or_else(|| self.bg_color.as_ref().and_then(ColorRef::css))
    }

    /// The text color decoded from the font attributes.
    pub fn text_css(&self) -> Option<String> {
        self.font
            .as_ref()
            .and_then(|f| f.color.as_ref())
            .and_then(ColorRef::css)
    }

    pub fn bold(&self) -> bool {
        self.font.as_ref().and_then(|f| f.bold).unwrap_or(false)
    }

    pub fn italic(&self) -> bool {
        self.font.as_ref().and_then(|f| f.italic).unwrap_or(false)
    }

    pub fn align(&self) -> Option<TextAlign> {
        self.alignment.as_ref().and_then(|a| a.horizontal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_direct_hex() {
        let color = Color::from_hex("#FF0000").unwrap();
        assert_eq!((color.r, color.g, color.b), (255, 0, 0));
        assert_eq!(color.to_css(), "#ff0000");

        let color2 = Color::from_hex("00FF00").unwrap();
        assert_eq!(color2.g, 255);
    }

    #[test]
    fn test_color_strips_argb_alpha() {
        let color = Color::from_hex("FFFF0000").unwrap();
        assert_eq!(color.to_css(), "#ff0000");
        assert_eq!(normalize_color("80336699"), Some("#336699".to_string()));
    }

    #[test]
    fn test_color_rejects_garbage() {
        assert!(Color::from_hex("red").is_none());
        assert!(Color::from_hex("#12345").is_none());
        assert!(normalize_color("").is_none());
    }

    #[test]
    fn test_payload_background_prefers_fill_foreground() {
        let payload: StylePayload = serde_json::from_str(
            r#"{"fgColor":{"rgb":"FFFFFF00"},"bgColor":{"rgb":"FF000000"}}"#,
        )
        .unwrap();
        assert_eq!(payload.background_css(), Some("#ffff00".to_string()));
    }

    #[test]
    fn test_payload_font_attributes() {
        let payload: StylePayload = serde_json::from_str(
            r#"{"font":{"bold":true,"color":{"rgb":"336699"}}}"#,
        )
        .unwrap();
        assert!(payload.bold());
        assert!(!payload.italic());
        assert_eq!(payload.text_css(), Some("#336699".to_string()));
    }

    #[test]
    fn test_payload_tolerates_empty_object() {
        let payload: StylePayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.background_css(), None);
        assert_eq!(payload.text_css(), None);
    }
}
