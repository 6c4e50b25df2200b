//! Record parsing errors

use thiserror::Error;

/// Errors raised at the document-to-record boundary
#[derive(Debug, Error)]
pub enum RecordError {
    /// The document could not be parsed into its typed record
    #[error("Malformed {collection} document {id}: {reason}")]
    Malformed {
        collection: &'static str,
        id: String,
        reason: String,
    },

    /// A record could not be serialized back into a document
    #[error("Unserializable {collection} record {id}: {reason}")]
    Unserializable {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

impl RecordError {
    pub fn malformed(
        collection: &'static str,
        id: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        RecordError::Malformed {
            collection,
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unserializable(
        collection: &'static str,
        id: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        RecordError::Unserializable {
            collection,
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}
