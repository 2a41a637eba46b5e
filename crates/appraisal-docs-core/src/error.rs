use thiserror::Error;

/// Errors raised while reading or mutating a document.
///
/// Absent placeholders are not errors; they surface as
/// [`PopulateOutcome::PlaceholderMissing`](crate::PopulateOutcome).
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Client is not connected")]
    NotConnected,

    #[error("No table found at or after index {0} after insert")]
    TableNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocsError>;
