//! The document store contract
//!
//! Services depend on `Arc<dyn DocumentStore>` and nothing else; there are
//! no ambient singletons. Production deployments plug in an adapter for
//! their document database; tests use [`crate::MemoryStore`].

use async_trait::async_trait;

use crate::document::{Document, Patch};
use crate::error::StoreError;
use crate::filter::Filter;

/// Generic get/query/write operations against named collections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a single document by id
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Returns all documents in a collection matching the filter
    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Creates a new document; fails if the id already exists
    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Applies a partial update to an existing document
    async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError>;

    /// Removes a document; missing documents are not an error
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Begins a transaction
    ///
    /// Reads through the transaction observe committed state as of the
    /// transaction, which is what precondition re-validation relies on.
    /// Dropping the transaction without committing discards all staged
    /// writes.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;
}

/// A read-then-write transaction
///
/// Writes are staged and applied atomically on commit: either every staged
/// write lands or none does. Staged writes are not visible to reads within
/// the same transaction.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Reads a document within the transaction boundary
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Queries within the transaction boundary
    async fn query(
        &mut self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError>;

    /// Stages a document creation or full replacement
    fn set(&mut self, collection: &str, document: Document);

    /// Stages a partial update
    fn update(&mut self, collection: &str, id: &str, patch: Patch);

    /// Atomically applies all staged writes
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
