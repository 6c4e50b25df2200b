//! The record boundary trait

use infra_store::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RecordError;

/// A typed record stored in a named collection
///
/// Implementors get document conversion in both directions; this is the
/// only place loose documents become typed values.
pub trait Record: Serialize + DeserializeOwned {
    /// The collection this record is stored in
    const COLLECTION: &'static str;

    /// The record's document id
    fn record_id(&self) -> String;

    /// Parses a store document into this record
    fn from_document(document: &Document) -> Result<Self, RecordError> {
        document
            .to_record()
            .map_err(|e| RecordError::malformed(Self::COLLECTION, &document.id, e))
    }

    /// Serializes this record into a store document
    fn to_document(&self) -> Result<Document, RecordError> {
        Document::from_record(self.record_id(), self)
            .map_err(|e| RecordError::unserializable(Self::COLLECTION, self.record_id(), e))
    }
}
