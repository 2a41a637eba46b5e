//! Drives placeholder filling against a [`DocumentStore`].
//!
//! Every operation that needs offsets fetches the document first; nothing
//! located here survives past the batch it was located for.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::error::{DocsError, Result};
use crate::gallery::{fill_grid_requests, insert_grid_requests, Gallery, GalleryOptions};
use crate::index::{cell_ranges, find_table_at_or_after, OffsetTracker, TextRange};
use crate::locate::{locate, locate_first};
use crate::metadata::MetadataBlock;
use crate::requests::substitution_requests;
use crate::store::DocumentStore;
use crate::title::{title_font_size, title_requests};

/// Result of a populate call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// Requests were submitted (possibly zero when there was nothing to do).
    Applied { requests: usize },
    /// The placeholder or title was not in the document; nothing changed.
    PlaceholderMissing,
}

pub struct DocumentPopulator {
    store: Arc<dyn DocumentStore>,
    options: GalleryOptions,
}

impl DocumentPopulator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_options(store, GalleryOptions::default())
    }

    pub fn with_options(store: Arc<dyn DocumentStore>, options: GalleryOptions) -> Self {
        Self { store, options }
    }

    /// Occurrences of each named placeholder in the current document.
    #[instrument(skip(self, names), level = "debug")]
    pub async fn locate_placeholders(
        &self,
        document_id: &str,
        names: &[&str],
    ) -> Result<BTreeMap<String, Vec<TextRange>>> {
        let document = self.store.get_document(document_id).await?;
        Ok(locate(&document, names))
    }

    /// Replace every `{{name}}` with its value in a single batch.
    #[instrument(skip(self, values), level = "debug", fields(count = values.len()))]
    pub async fn replace_placeholders(
        &self,
        document_id: &str,
        values: &BTreeMap<String, Option<String>>,
    ) -> Result<PopulateOutcome> {
        let requests = substitution_requests(values);
        if requests.is_empty() {
            return Ok(PopulateOutcome::Applied { requests: 0 });
        }

        self.store.batch_update(document_id, &requests).await?;
        debug!(
            "Replaced {} placeholders in document {}",
            requests.len(),
            document_id
        );
        Ok(PopulateOutcome::Applied {
            requests: requests.len(),
        })
    }

    /// Replace `{{name}}` with a formatted key/value block.
    pub async fn insert_metadata_block(
        &self,
        document_id: &str,
        name: &str,
        data: &str,
    ) -> Result<PopulateOutcome> {
        let mut blocks = BTreeMap::new();
        blocks.insert(name.to_string(), data.to_string());
        self.insert_metadata_blocks(document_id, &blocks).await
    }

    /// Replace several placeholders with formatted blocks in one batch.
    ///
    /// Blocks are applied in document order; each located offset is mapped
    /// through the drift of the blocks already emitted before it.
    #[instrument(skip(self, blocks), level = "debug", fields(count = blocks.len()))]
    pub async fn insert_metadata_blocks(
        &self,
        document_id: &str,
        blocks: &BTreeMap<String, String>,
    ) -> Result<PopulateOutcome> {
        if blocks.is_empty() {
            return Ok(PopulateOutcome::Applied { requests: 0 });
        }

        let document = self.store.get_document(document_id).await?;

        let mut located: Vec<(TextRange, MetadataBlock)> = Vec::new();
        for (name, data) in blocks {
            match locate_first(&document, name) {
                Some(token) => located.push((token, MetadataBlock::parse(data))),
                None => warn!(
                    "Placeholder {{{{{}}}}} not found in document {}, skipping metadata block",
                    name, document_id
                ),
            }
        }

        if located.is_empty() {
            return Ok(PopulateOutcome::PlaceholderMissing);
        }

        located.sort_by_key(|(token, _)| token.start_index);

        let mut tracker = OffsetTracker::new();
        let mut requests = Vec::new();
        for (token, block) in &located {
            let token = tracker.map_range(*token);
            requests.extend(block.requests(token));
            tracker.record_delete(token);
            tracker.record_insert(token.start_index, block_len(block));
        }

        self.store.batch_update(document_id, &requests).await?;
        debug!(
            "Inserted {} metadata blocks into document {}",
            located.len(),
            document_id
        );
        Ok(PopulateOutcome::Applied {
            requests: requests.len(),
        })
    }

    /// Replace a gallery placeholder with a table of images.
    ///
    /// Two batches: the table insert, then cell styling and images against
    /// offsets re-read after the insert.
    #[instrument(skip(self, gallery), level = "debug", fields(placeholder = %gallery.placeholder))]
    pub async fn populate_gallery(
        &self,
        document_id: &str,
        gallery: &Gallery,
    ) -> Result<PopulateOutcome> {
        let document = self.store.get_document(document_id).await?;

        let Some(token) = locate_first(&document, &gallery.placeholder) else {
            warn!(
                "Gallery placeholder {{{{{}}}}} not found in document {}",
                gallery.placeholder, document_id
            );
            return Ok(PopulateOutcome::PlaceholderMissing);
        };

        let insert = insert_grid_requests(token, gallery.rows, gallery.columns)?;
        self.store.batch_update(document_id, &insert).await?;

        let document = self.store.get_document(document_id).await?;
        let table = find_table_at_or_after(&document, token.start_index)
            .ok_or(DocsError::TableNotFound(token.start_index))?;
        let cells = cell_ranges(table);

        let fill =
            fill_grid_requests(table.start_index, &cells, &gallery.images, &self.options);
        if !fill.is_empty() {
            self.store.batch_update(document_id, &fill).await?;
        }

        let placed = gallery.images.len().min(cells.len());
        if gallery.images.len() > placed {
            debug!(
                "Dropped {} images that did not fit the {}x{} gallery",
                gallery.images.len() - placed,
                gallery.rows,
                gallery.columns
            );
        }
        info!(
            "Populated gallery in document {} with {} images",
            document_id, placed
        );

        Ok(PopulateOutcome::Applied {
            requests: insert.len() + fill.len(),
        })
    }

    /// Size the title run by its length.
    #[instrument(skip(self), level = "debug")]
    pub async fn adjust_title_size(&self, document_id: &str, title: &str) -> Result<PopulateOutcome> {
        let document = self.store.get_document(document_id).await?;

        let Some(request) = title_requests(&document, title) else {
            warn!("Title {:?} not found in document {}", title, document_id);
            return Ok(PopulateOutcome::PlaceholderMissing);
        };

        self.store
            .batch_update(document_id, std::slice::from_ref(&request))
            .await?;
        debug!(
            "Set title font size to {}pt in document {}",
            title_font_size(title),
            document_id
        );
        Ok(PopulateOutcome::Applied { requests: 1 })
    }
}

fn block_len(block: &MetadataBlock) -> i64 {
    crate::index::utf16_len(&block.text)
}
