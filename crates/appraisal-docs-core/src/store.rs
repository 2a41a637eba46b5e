use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::DocsError;
use crate::requests::EditOperation;

/// Reply to a `batchUpdate` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateReply {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}

/// The external document service.
///
/// A batch is applied atomically and in array order. Batches against the
/// same document must not run concurrently; offsets in one batch are only
/// valid against the state read just before it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the full document structure.
    async fn get_document(&self, document_id: &str) -> Result<Document, DocsError>;

    /// Apply `requests` as one batch.
    async fn batch_update(
        &self,
        document_id: &str,
        requests: &[EditOperation],
    ) -> Result<BatchUpdateReply, DocsError>;
}
