//! Read-side model of a Google Docs document.
//!
//! Only the parts of the Docs API `Document` resource needed to locate
//! placeholders and table cells are modelled; unknown fields are ignored.
//! A missing `startIndex` is reported by the API for the first element of a
//! segment and means 0.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Body,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// A paragraph or table occupying `[start_index, end_index)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    #[serde(default)]
    pub start_index: i64,
    #[serde(default)]
    pub end_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<Paragraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    #[serde(default)]
    pub start_index: i64,
    #[serde(default)]
    pub end_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub columns: usize,
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub start_index: i64,
    #[serde(default)]
    pub end_index: i64,
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub start_index: i64,
    #[serde(default)]
    pub end_index: i64,
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

impl Document {
    /// Visit every text run in document order, descending into table cells
    /// and nested tables to any depth.
    pub fn for_each_text_run<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a ParagraphElement, &'a TextRun),
    {
        walk_runs(&self.body.content, &mut f);
    }

    /// Top-level tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = &StructuralElement> {
        self.body.content.iter().filter(|el| el.table.is_some())
    }

    /// Tables at every depth, depth-first in document order. A table is
    /// yielded before the tables nested in its cells.
    pub fn all_tables(&self) -> Vec<&StructuralElement> {
        let mut tables = Vec::new();
        walk_tables(&self.body.content, &mut tables);
        tables
    }
}

fn walk_tables<'a>(content: &'a [StructuralElement], out: &mut Vec<&'a StructuralElement>) {
    for element in content {
        if let Some(table) = &element.table {
            out.push(element);
            for row in &table.table_rows {
                for cell in &row.table_cells {
                    walk_tables(&cell.content, out);
                }
            }
        }
    }
}

fn walk_runs<'a, F>(content: &'a [StructuralElement], f: &mut F)
where
    F: FnMut(&'a ParagraphElement, &'a TextRun),
{
    for element in content {
        if let Some(paragraph) = &element.paragraph {
            for pe in &paragraph.elements {
                if let Some(run) = &pe.text_run {
                    f(pe, run);
                }
            }
        }
        if let Some(table) = &element.table {
            for row in &table.table_rows {
                for cell in &row.table_cells {
                    walk_runs(&cell.content, f);
                }
            }
        }
    }
}
