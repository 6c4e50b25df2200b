//! Document store infrastructure
//!
//! The hospital core persists everything through a generic document store:
//! named collections of `{ id, ...fields }` documents. This crate defines
//! that contract (`DocumentStore` / `StoreTransaction`), the value types
//! that cross it (`Document`, `Patch`, `Filter`), and `MemoryStore`, an
//! in-memory implementation with serializable transactions used by tests
//! and as the reference semantics for production adapters.
//!
//! Two operations in the system are transactional (bed assignment and
//! discharge finalization); everything else is a single-document write.
//! Transactions re-read the documents they mutate inside the transaction
//! boundary, so a precondition invalidated by a concurrent commit is seen
//! before any write is applied.

pub mod document;
pub mod filter;
pub mod store;
pub mod memory;
pub mod error;

pub use document::{Document, Patch, strip_nulls_deep};
pub use filter::Filter;
pub use store::{DocumentStore, StoreTransaction};
pub use memory::MemoryStore;
pub use error::StoreError;
