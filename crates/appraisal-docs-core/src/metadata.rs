//! Formatted key/value blocks such as `"Name: Leonardo - Period: Renaissance"`.
//!
//! Each keyed row renders as `**key:** value` with `key:` bolded. Bold
//! ranges are tracked while the text is assembled, so they stay correct for
//! any row or separator width.

use crate::index::{utf16_len, TextRange};
use crate::requests::EditOperation;

const ROW_SEPARATOR: char = '-';
const LINE_SEPARATOR: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataRow {
    Keyed { key: String, value: String },
    /// A segment without a usable `key:` prefix.
    Bare(String),
}

/// Split a mini-format string into rows. Never fails: segments that do not
/// have the `key: value` shape become bare rows.
pub fn parse_rows(data: &str) -> Vec<MetadataRow> {
    data.split(ROW_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => MetadataRow::Keyed {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            _ => MetadataRow::Bare(segment.to_string()),
        })
        .collect()
}

/// Rendered block text plus bold ranges relative to the block start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    pub text: String,
    pub bold_ranges: Vec<TextRange>,
}

impl MetadataBlock {
    pub fn parse(data: &str) -> Self {
        Self::from_rows(&parse_rows(data))
    }

    pub fn from_rows(rows: &[MetadataRow]) -> Self {
        let mut text = String::new();
        let mut bold_ranges = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                text.push_str(LINE_SEPARATOR);
            }
            match row {
                MetadataRow::Keyed { key, value } => {
                    text.push_str("**");
                    let label = format!("{}:", key);
                    let start = utf16_len(&text);
                    text.push_str(&label);
                    bold_ranges.push(TextRange::new(start, start + utf16_len(&label)));
                    text.push_str("**");
                    if !value.is_empty() {
                        text.push(' ');
                        text.push_str(value);
                    }
                }
                MetadataRow::Bare(value) => text.push_str(value),
            }
        }

        Self { text, bold_ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Requests that replace the placeholder token at `token` with this block.
    ///
    /// Order matters: the delete and insert both target `token.start_index`,
    /// and the bold ranges are absolute offsets after the insert.
    pub fn requests(&self, token: TextRange) -> Vec<EditOperation> {
        let at = token.start_index;
        let mut requests = vec![EditOperation::delete(token)];
        if !self.text.is_empty() {
            requests.push(EditOperation::insert_text(at, self.text.clone()));
            requests.extend(
                self.bold_ranges
                    .iter()
                    .map(|range| EditOperation::bold(range.shifted(at))),
            );
        }
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_block_round_trip() {
        let block = MetadataBlock::parse("Name: Leonardo - Period: Renaissance");

        assert_eq!(block.text, "**Name:** Leonardo\n**Period:** Renaissance");
        let bolded: Vec<&str> = block
            .bold_ranges
            .iter()
            .map(|r| &block.text[r.start_index as usize..r.end_index as usize])
            .collect();
        assert_eq!(bolded, vec!["Name:", "Period:"]);
    }

    #[test]
    fn test_requests_use_absolute_offsets() {
        let block = MetadataBlock::parse("Name: Leonardo - Period: Renaissance");
        let requests = block.requests(TextRange::new(40, 52));

        assert_eq!(
            requests,
            vec![
                EditOperation::delete(TextRange::new(40, 52)),
                EditOperation::insert_text(40, "**Name:** Leonardo\n**Period:** Renaissance"),
                EditOperation::bold(TextRange::new(42, 47)),
                EditOperation::bold(TextRange::new(61, 68)),
            ]
        );
    }

    #[rstest]
    #[case("Key1: Value1 - Key2: Value2 - Key3 -", vec![
        MetadataRow::Keyed { key: "Key1".into(), value: "Value1".into() },
        MetadataRow::Keyed { key: "Key2".into(), value: "Value2".into() },
        MetadataRow::Bare("Key3".into()),
    ])]
    #[case(" - - ", vec![])]
    #[case(": orphan value", vec![MetadataRow::Bare(": orphan value".into())])]
    #[case("Ratio: 3:2", vec![
        MetadataRow::Keyed { key: "Ratio".into(), value: "3:2".into() },
    ])]
    fn test_parse_rows(#[case] input: &str, #[case] expected: Vec<MetadataRow>) {
        assert_eq!(parse_rows(input), expected);
    }

    #[test]
    fn test_bare_rows_are_not_bolded() {
        let block = MetadataBlock::parse("Signed - Medium: Oil");
        assert_eq!(block.text, "Signed\n**Medium:** Oil");
        assert_eq!(block.bold_ranges, vec![TextRange::new(9, 16)]);
    }

    #[test]
    fn test_wide_characters_shift_later_rows() {
        let block = MetadataBlock::parse("Artist: Dürer 🎨 - Year: 1500");
        let second = block.bold_ranges[1];
        // "**Artist:** Dürer 🎨" is 20 UTF-16 units, plus the newline and "**".
        assert_eq!(second, TextRange::new(23, 28));
    }

    #[test]
    fn test_empty_block_only_deletes_token() {
        let block = MetadataBlock::parse("  ");
        assert!(block.is_empty());
        assert_eq!(
            block.requests(TextRange::new(3, 10)),
            vec![EditOperation::delete(TextRange::new(3, 10))]
        );
    }
}
