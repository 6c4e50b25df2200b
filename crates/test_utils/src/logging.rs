//! Test log capture
//!
//! Installs a single fmt subscriber for the whole test binary so
//! `RUST_LOG=debug cargo test` shows service tracing inline with test
//! output.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .init();
});

/// Initializes tracing once; later calls are no-ops
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
