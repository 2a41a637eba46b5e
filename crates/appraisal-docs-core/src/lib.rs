//! Core types and logic for filling appraisal Google Docs templates.
//!
//! This crate is transport-agnostic:
//! - `Document`: read-side model of a Docs API document
//! - `locate`: placeholder discovery over the content tree
//! - `EditOperation`: batch requests in Docs API wire format
//! - `MetadataBlock`, `gallery`, `title`: request builders for each content kind
//! - `DocumentStore`: the external service that applies batches
//! - `DocumentPopulator`: orchestration over an injected store

#![recursion_limit = "256"]

mod document;
mod error;
pub mod gallery;
pub mod index;
pub mod locate;
mod metadata;
mod populator;
mod requests;
mod store;
pub mod title;

pub use document::{
    Body, Document, Paragraph, ParagraphElement, StructuralElement, Table, TableCell, TableRow,
    TextRun,
};
pub use error::{DocsError, Result};
pub use gallery::{Gallery, GalleryOptions, ImagePlacement};
pub use index::{CellRange, OffsetTracker, TextRange};
pub use metadata::{parse_rows, MetadataBlock, MetadataRow};
pub use populator::{DocumentPopulator, PopulateOutcome};
pub use requests::{
    substitution_requests, values_from_json, DeleteRange, Dimension, EditOperation, InsertImage,
    InsertTable, InsertText, Location, ParagraphStyle, ReplaceAllText, SetCellStyle,
    SetParagraphStyle, SetTextStyle, Size, SubstringMatch, TableCellLocation, TableCellStyle,
    TableRange, TextStyle,
};
pub use store::{BatchUpdateReply, DocumentStore};
