//! Edit operations, serialized as Docs API `batchUpdate` requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::index::TextRange;
use crate::locate::placeholder_token;

/// One structural edit in a batch.
///
/// Serializes to the request shape the Docs API expects, e.g.
/// `{"deleteContentRange": {"range": {...}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditOperation {
    ReplaceAllText(ReplaceAllText),
    #[serde(rename = "deleteContentRange")]
    DeleteRange(DeleteRange),
    InsertText(InsertText),
    InsertTable(InsertTable),
    #[serde(rename = "insertInlineImage")]
    InsertImage(InsertImage),
    #[serde(rename = "updateTableCellStyle")]
    SetCellStyle(SetCellStyle),
    #[serde(rename = "updateParagraphStyle")]
    SetParagraphStyle(SetParagraphStyle),
    #[serde(rename = "updateTextStyle")]
    SetTextStyle(SetTextStyle),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllText {
    pub contains_text: SubstringMatch,
    pub replace_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatch {
    pub text: String,
    pub match_case: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRange {
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertText {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertTable {
    pub rows: usize,
    pub columns: usize,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertImage {
    pub uri: String,
    pub location: Location,
    pub object_size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub height: Dimension,
    pub width: Dimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: String,
}

impl Dimension {
    pub fn pt(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: "PT".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCellStyle {
    pub table_range: TableRange,
    pub table_cell_style: TableCellStyle,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRange {
    pub table_cell_location: TableCellLocation,
    pub row_span: usize,
    pub column_span: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    pub table_start_location: Location,
    pub row_index: usize,
    pub column_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_alignment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetParagraphStyle {
    pub range: TextRange,
    pub paragraph_style: ParagraphStyle,
    pub fields: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTextStyle {
    pub range: TextRange,
    pub text_style: TextStyle,
    pub fields: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
}

impl EditOperation {
    /// Replace every case-sensitive occurrence of `{{name}}` with `value`.
    pub fn replace_placeholder(name: &str, value: &str) -> Self {
        Self::ReplaceAllText(ReplaceAllText {
            contains_text: SubstringMatch {
                text: placeholder_token(name),
                match_case: true,
            },
            replace_text: value.to_string(),
        })
    }

    pub fn delete(range: TextRange) -> Self {
        Self::DeleteRange(DeleteRange { range })
    }

    pub fn insert_text(index: i64, text: impl Into<String>) -> Self {
        Self::InsertText(InsertText {
            location: Location { index },
            text: text.into(),
        })
    }

    pub fn insert_table(index: i64, rows: usize, columns: usize) -> Self {
        Self::InsertTable(InsertTable {
            rows,
            columns,
            location: Location { index },
        })
    }

    /// Inline image scaled to fit a square box of `size_pt` points.
    pub fn insert_image(index: i64, uri: impl Into<String>, size_pt: f64) -> Self {
        Self::InsertImage(InsertImage {
            uri: uri.into(),
            location: Location { index },
            object_size: Size {
                height: Dimension::pt(size_pt),
                width: Dimension::pt(size_pt),
            },
        })
    }

    /// Uniform padding and vertical centering for one cell.
    pub fn cell_style(table_start: i64, row: usize, column: usize, padding_pt: f64) -> Self {
        Self::SetCellStyle(SetCellStyle {
            table_range: TableRange {
                table_cell_location: TableCellLocation {
                    table_start_location: Location { index: table_start },
                    row_index: row,
                    column_index: column,
                },
                row_span: 1,
                column_span: 1,
            },
            table_cell_style: TableCellStyle {
                padding_top: Some(Dimension::pt(padding_pt)),
                padding_bottom: Some(Dimension::pt(padding_pt)),
                padding_left: Some(Dimension::pt(padding_pt)),
                padding_right: Some(Dimension::pt(padding_pt)),
                content_alignment: Some("MIDDLE".to_string()),
            },
            fields: "paddingTop,paddingBottom,paddingLeft,paddingRight,contentAlignment"
                .to_string(),
        })
    }

    pub fn center_paragraphs(range: TextRange) -> Self {
        Self::SetParagraphStyle(SetParagraphStyle {
            range,
            paragraph_style: ParagraphStyle {
                alignment: Some("CENTER".to_string()),
            },
            fields: "alignment".to_string(),
        })
    }

    pub fn bold(range: TextRange) -> Self {
        Self::SetTextStyle(SetTextStyle {
            range,
            text_style: TextStyle {
                bold: Some(true),
                ..Default::default()
            },
            fields: "bold".to_string(),
        })
    }

    pub fn font_size(range: TextRange, size_pt: f64) -> Self {
        Self::SetTextStyle(SetTextStyle {
            range,
            text_style: TextStyle {
                font_size: Some(Dimension::pt(size_pt)),
                ..Default::default()
            },
            fields: "fontSize".to_string(),
        })
    }
}

/// One replace-all operation per placeholder name.
///
/// Substitution matches on content rather than offsets, so the operations
/// are independent of each other and of any earlier edit. Absent values
/// become the empty string.
pub fn substitution_requests(values: &BTreeMap<String, Option<String>>) -> Vec<EditOperation> {
    values
        .iter()
        .map(|(name, value)| EditOperation::replace_placeholder(name, value.as_deref().unwrap_or("")))
        .collect()
}

/// Flatten a JSON object into placeholder values.
///
/// Strings are used verbatim, `null` is absent, anything else is rendered
/// as JSON text.
pub fn values_from_json(
    map: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, Option<String>> {
    map.iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            };
            (key.clone(), text)
        })
        .collect()
}
