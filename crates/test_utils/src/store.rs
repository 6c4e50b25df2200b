//! In-memory store seeding
//!
//! Tests seed a [`MemoryStore`] with typed records and then exercise
//! services against it through the `DocumentStore` trait.

use std::sync::Arc;

use domain_records::Record;
use infra_store::{DocumentStore, MemoryStore};

/// Creates an empty in-memory store behind the trait object services take
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Inserts a record into its collection, panicking on any failure
pub async fn seed<R: Record>(store: &Arc<MemoryStore>, record: &R) {
    let document = record
        .to_document()
        .unwrap_or_else(|e| panic!("seed: failed to serialize {}: {e}", R::COLLECTION));
    store
        .insert(R::COLLECTION, document)
        .await
        .unwrap_or_else(|e| panic!("seed: failed to insert into {}: {e}", R::COLLECTION));
}

/// Seeds several records of the same type
pub async fn seed_all<R: Record>(store: &Arc<MemoryStore>, records: &[R]) {
    for record in records {
        seed(store, record).await;
    }
}
