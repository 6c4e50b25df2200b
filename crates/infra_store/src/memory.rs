//! In-memory document store
//!
//! `MemoryStore` is the reference implementation of the store contract.
//! Transactions take an owned write lock over the whole store, giving
//! serializable semantics: of two concurrent transactions, the second
//! begins only after the first commits or is dropped, so its reads always
//! observe the winner's writes. That matches the guarantee the domain
//! layer needs for bed assignment and discharge finalization.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use crate::document::{Document, Patch};
use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::{DocumentStore, StoreTransaction};

type Fields = Map<String, Value>;
type Collections = HashMap<String, HashMap<String, Fields>>;

/// In-memory implementation of [`DocumentStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn get_from(collections: &Collections, collection: &str, id: &str) -> Option<Document> {
    collections
        .get(collection)
        .and_then(|docs| docs.get(id))
        .map(|data| Document::new(id, data.clone()))
}

fn query_from(collections: &Collections, collection: &str, filter: &Filter) -> Vec<Document> {
    let mut results: Vec<Document> = collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, data)| filter.matches(data))
                .map(|(id, data)| Document::new(id.clone(), data.clone()))
                .collect()
        })
        .unwrap_or_default();
    // Deterministic order for tests and idempotent aggregation
    results.sort_by(|a, b| a.id.cmp(&b.id));
    results
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(get_from(&collections, collection, id))
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(query_from(&collections, collection, filter))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&document.id) {
            return Err(StoreError::already_exists(collection, &document.id));
        }
        docs.insert(document.id, document.data);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let data = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        patch.apply_to(data);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let guard = self.collections.clone().write_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            staged: Vec::new(),
        }))
    }
}

enum StagedWrite {
    Set {
        collection: String,
        document: Document,
    },
    Update {
        collection: String,
        id: String,
        patch: Patch,
    },
}

/// A transaction over the in-memory store
///
/// Holds the store's write lock for its whole lifetime; dropping without
/// commit releases the lock and discards staged writes.
struct MemoryTransaction {
    guard: OwnedRwLockWriteGuard<Collections>,
    staged: Vec<StagedWrite>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(get_from(&self.guard, collection, id))
    }

    async fn query(
        &mut self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(query_from(&self.guard, collection, filter))
    }

    fn set(&mut self, collection: &str, document: Document) {
        self.staged.push(StagedWrite::Set {
            collection: collection.to_string(),
            document,
        });
    }

    fn update(&mut self, collection: &str, id: &str, patch: Patch) {
        self.staged.push(StagedWrite::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            patch,
        });
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        // Validate every update target before applying anything, so a bad
        // write cannot leave the transaction half-applied.
        for write in &self.staged {
            if let StagedWrite::Update { collection, id, .. } = write {
                let exists = self
                    .guard
                    .get(collection)
                    .map(|docs| docs.contains_key(id))
                    .unwrap_or(false)
                    || self.staged.iter().any(|w| {
                        matches!(w, StagedWrite::Set { collection: c, document }
                            if c == collection && document.id == *id)
                    });
                if !exists {
                    return Err(StoreError::not_found(collection.clone(), id.clone()));
                }
            }
        }

        let count = self.staged.len();
        for write in self.staged.drain(..) {
            match write {
                StagedWrite::Set {
                    collection,
                    document,
                } => {
                    self.guard
                        .entry(collection)
                        .or_default()
                        .insert(document.id, document.data);
                }
                StagedWrite::Update {
                    collection,
                    id,
                    patch,
                } => {
                    if let Some(data) = self
                        .guard
                        .get_mut(&collection)
                        .and_then(|docs| docs.get_mut(&id))
                    {
                        patch.apply_to(data);
                    }
                }
            }
        }
        debug!(writes = count, "transaction committed");
        Ok(())
    }
}
