//! Image gallery tables.
//!
//! Population is two-phase: the first batch swaps the placeholder for an
//! empty table, then the caller re-reads the document to learn the cell
//! ranges the server assigned, and the second batch styles cells and drops
//! images into them.

use serde::{Deserialize, Serialize};

use crate::error::{DocsError, Result};
use crate::index::{CellRange, TextRange};
use crate::requests::EditOperation;

pub const DEFAULT_IMAGE_SIZE_PT: f64 = 150.0;
pub const DEFAULT_CELL_PADDING_PT: f64 = 5.0;

/// A gallery to render at a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub placeholder: String,
    pub rows: usize,
    pub columns: usize,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalleryOptions {
    /// Images are scaled into a square box of this many points.
    pub image_size_pt: f64,
    pub cell_padding_pt: f64,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            image_size_pt: DEFAULT_IMAGE_SIZE_PT,
            cell_padding_pt: DEFAULT_CELL_PADDING_PT,
        }
    }
}

/// An image assigned to a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub row: usize,
    pub column: usize,
    pub uri: String,
    pub index: i64,
}

/// Phase one: remove the token and insert an empty `rows` x `columns` table
/// where it was.
pub fn insert_grid_requests(
    token: TextRange,
    rows: usize,
    columns: usize,
) -> Result<Vec<EditOperation>> {
    if rows == 0 || columns == 0 {
        return Err(DocsError::InvalidInput(format!(
            "gallery grid must have at least one row and column, got {}x{}",
            rows, columns
        )));
    }
    Ok(vec![
        EditOperation::delete(token),
        EditOperation::insert_table(token.start_index, rows, columns),
    ])
}

/// Assign images to cells in row-major order. Extra images are dropped and
/// extra cells stay empty.
pub fn place_images(cells: &[CellRange], images: &[String]) -> Vec<ImagePlacement> {
    let mut ordered: Vec<&CellRange> = cells.iter().collect();
    ordered.sort_by_key(|cell| (cell.row, cell.column));

    ordered
        .into_iter()
        .zip(images)
        .map(|(cell, uri)| ImagePlacement {
            row: cell.row,
            column: cell.column,
            uri: uri.clone(),
            index: cell.insert_index(),
        })
        .collect()
}

/// Phase two: style every cell, then insert images.
///
/// Style requests do not move text, so they come first and use the
/// freshly read offsets. Image inserts each add one position, so they run
/// from the highest index down to keep the remaining offsets valid.
pub fn fill_grid_requests(
    table_start: i64,
    cells: &[CellRange],
    images: &[String],
    options: &GalleryOptions,
) -> Vec<EditOperation> {
    let mut requests = Vec::with_capacity(cells.len() * 2 + images.len().min(cells.len()));

    for cell in cells {
        requests.push(EditOperation::cell_style(
            table_start,
            cell.row,
            cell.column,
            options.cell_padding_pt,
        ));
    }
    for cell in cells {
        requests.push(EditOperation::center_paragraphs(cell.content));
    }

    let mut placements = place_images(cells, images);
    placements.sort_by(|a, b| b.index.cmp(&a.index));
    requests.extend(
        placements
            .into_iter()
            .map(|p| EditOperation::insert_image(p.index, p.uri, options.image_size_pt)),
    );

    requests
}
