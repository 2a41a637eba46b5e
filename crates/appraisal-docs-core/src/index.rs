//! Offset bookkeeping for the document's linear index space.
//!
//! Docs API indices count UTF-16 code units. Every offset here is in that
//! unit, never in bytes or chars.

use serde::{Deserialize, Serialize};

use crate::document::{Document, StructuralElement};

/// Half-open range `[start_index, end_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_index: i64,
    pub end_index: i64,
}

impl TextRange {
    pub fn new(start_index: i64, end_index: i64) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> i64 {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start_index < other.end_index && other.start_index < self.end_index
    }

    pub fn shifted(&self, delta: i64) -> Self {
        Self::new(self.start_index + delta, self.end_index + delta)
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> i64 {
    s.encode_utf16().count() as i64
}

/// UTF-16 offset of the byte position `byte_idx` within `s`.
pub fn utf16_offset(s: &str, byte_idx: usize) -> i64 {
    utf16_len(&s[..byte_idx])
}

/// Location of one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub row: usize,
    pub column: usize,
    /// The cell's own range; `start_index` is the cell start marker.
    pub cell: TextRange,
    /// Span of the paragraphs inside the cell.
    pub content: TextRange,
}

impl CellRange {
    /// First insertable position inside the cell.
    pub fn insert_index(&self) -> i64 {
        self.cell.start_index + 1
    }
}

/// Cell ranges of a table element in row-major order.
pub fn cell_ranges(table_element: &StructuralElement) -> Vec<CellRange> {
    let Some(table) = &table_element.table else {
        return Vec::new();
    };

    let mut cells = Vec::new();
    for (row, table_row) in table.table_rows.iter().enumerate() {
        for (column, cell) in table_row.table_cells.iter().enumerate() {
            let content_start = cell
                .content
                .first()
                .map(|el| el.start_index)
                .unwrap_or(cell.start_index + 1);
            let content_end = cell
                .content
                .last()
                .map(|el| el.end_index)
                .unwrap_or(cell.end_index);
            cells.push(CellRange {
                row,
                column,
                cell: TextRange::new(cell.start_index, cell.end_index),
                content: TextRange::new(content_start, content_end),
            });
        }
    }
    cells
}

/// The table, at any nesting depth, with the smallest start at or after
/// `index`.
///
/// An `insertTable` at `index` creates the table just after that position,
/// so this finds the table produced by such an insert, including one
/// inserted inside another table's cell.
pub fn find_table_at_or_after(document: &Document, index: i64) -> Option<&StructuralElement> {
    document
        .all_tables()
        .into_iter()
        .filter(|el| el.start_index >= index)
        .min_by_key(|el| el.start_index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Insert { at: i64, len: i64 },
    Delete(TextRange),
}

/// Predicts offset drift for edits applied serially within one batch.
///
/// Edits are recorded in execution order, each expressed in the coordinates
/// of the document as it stands when that edit runs. [`OffsetTracker::map`]
/// translates a pre-batch offset into the coordinates after all recorded
/// edits.
#[derive(Debug, Clone, Default)]
pub struct OffsetTracker {
    edits: Vec<Edit>,
}

impl OffsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_insert(&mut self, at: i64, len: i64) {
        if len > 0 {
            self.edits.push(Edit::Insert { at, len });
        }
    }

    pub fn record_delete(&mut self, range: TextRange) {
        if !range.is_empty() {
            self.edits.push(Edit::Delete(range));
        }
    }

    /// Map a pre-batch offset through every recorded edit.
    ///
    /// An offset inside a deleted range collapses to the deletion start.
    pub fn map(&self, offset: i64) -> i64 {
        self.edits.iter().fold(offset, |pos, edit| match *edit {
            Edit::Insert { at, len } if pos >= at => pos + len,
            Edit::Insert { .. } => pos,
            Edit::Delete(range) if pos >= range.end_index => pos - range.len(),
            Edit::Delete(range) if pos > range.start_index => range.start_index,
            Edit::Delete(_) => pos,
        })
    }

    pub fn map_range(&self, range: TextRange) -> TextRange {
        let start = self.map(range.start_index);
        TextRange::new(start, start + range.len())
    }

    /// Total length change of everything recorded so far.
    pub fn net_shift(&self) -> i64 {
        self.edits
            .iter()
            .map(|edit| match *edit {
                Edit::Insert { len, .. } => len,
                Edit::Delete(range) => -range.len(),
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_utf16_len_counts_surrogate_pairs() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("é"), 1);
        assert_eq!(utf16_len("🖼"), 2);
        assert_eq!(utf16_offset("🖼 {{x}}", "🖼 ".len()), 3);
    }

    #[test]
    fn test_tracker_insert_and_delete() {
        let mut tracker = OffsetTracker::new();
        // Replace "{{a}}" at [10, 15) with 20 characters.
        tracker.record_delete(TextRange::new(10, 15));
        tracker.record_insert(10, 20);

        assert_eq!(tracker.map(5), 5);
        assert_eq!(tracker.map(15), 30);
        assert_eq!(tracker.map(40), 55);
        assert_eq!(tracker.net_shift(), 15);
        assert_eq!(tracker.map_range(TextRange::new(40, 45)), TextRange::new(55, 60));
    }

    #[test]
    fn test_tracker_offset_inside_deleted_range_collapses() {
        let mut tracker = OffsetTracker::new();
        tracker.record_delete(TextRange::new(10, 15));
        assert_eq!(tracker.map(12), 10);
        assert_eq!(tracker.map(10), 10);
    }

    #[test]
    fn test_tracker_ignores_empty_edits() {
        let mut tracker = OffsetTracker::new();
        tracker.record_insert(3, 0);
        tracker.record_delete(TextRange::new(4, 4));
        assert_eq!(tracker.map(10), 10);
        assert_eq!(tracker.net_shift(), 0);
    }

    #[test]
    fn test_cell_ranges_row_major() {
        let table: StructuralElement = serde_json::from_value(serde_json::json!({
            "startIndex": 20, "endIndex": 40,
            "table": { "rows": 2, "columns": 2, "tableRows": [
                { "startIndex": 21, "endIndex": 30, "tableCells": [
                    { "startIndex": 22, "endIndex": 25, "content": [{ "startIndex": 23, "endIndex": 25 }] },
                    { "startIndex": 25, "endIndex": 30, "content": [{ "startIndex": 26, "endIndex": 30 }] }
                ]},
                { "startIndex": 30, "endIndex": 40, "tableCells": [
                    { "startIndex": 31, "endIndex": 35, "content": [{ "startIndex": 32, "endIndex": 35 }] },
                    { "startIndex": 35, "endIndex": 40, "content": [] }
                ]}
            ]}
        }))
        .unwrap();

        let cells = cell_ranges(&table);
        let order: Vec<_> = cells.iter().map(|c| (c.row, c.column)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(cells[0].insert_index(), 23);
        assert_eq!(cells[2].content, TextRange::new(32, 35));
        // Empty content falls back to the cell interior.
        assert_eq!(cells[3].content, TextRange::new(36, 40));
    }

    #[test]
    fn test_find_table_prefers_nested_table_closest_to_index() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "body": { "content": [
                { "startIndex": 1, "endIndex": 45, "table": { "rows": 1, "columns": 1, "tableRows": [
                    { "startIndex": 2, "endIndex": 44, "tableCells": [
                        { "startIndex": 3, "endIndex": 44, "content": [
                            { "startIndex": 4, "endIndex": 5, "paragraph": { "elements": [] } },
                            { "startIndex": 5, "endIndex": 10, "table": { "rows": 1, "columns": 1, "tableRows": [] } },
                            { "startIndex": 10, "endIndex": 44, "paragraph": { "elements": [] } }
                        ]}
                    ]}
                ]}},
                { "startIndex": 45, "endIndex": 65, "table": { "rows": 1, "columns": 1, "tableRows": [] } }
            ]}
        }))
        .unwrap();

        assert_eq!(find_table_at_or_after(&doc, 4).map(|t| t.start_index), Some(5));
        assert_eq!(find_table_at_or_after(&doc, 11).map(|t| t.start_index), Some(45));
        assert!(find_table_at_or_after(&doc, 66).is_none());
    }
}
