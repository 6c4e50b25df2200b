//! Test Utilities Crate
//!
//! Shared test infrastructure for the hospital core test suites.
//!
//! # Modules
//!
//! - `fixtures`: fixed amounts and instants for deterministic scenarios
//! - `builders`: builder patterns for record construction
//! - `logging`: one-shot tracing subscriber for test binaries
//! - `store`: in-memory store seeding helpers
//! - `assertions`: fresh-read assertions against the store

pub mod fixtures;
pub mod builders;
pub mod logging;
pub mod store;
pub mod assertions;

pub use fixtures::*;
pub use builders::*;
pub use logging::init_tracing;
pub use store::*;
pub use assertions::*;
