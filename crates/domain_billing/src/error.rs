//! Billing domain errors

use core_kernel::MoneyError;
use domain_records::RecordError;
use infra_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Bill not found
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// Patient not found
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// The appointment already has a bill attached
    #[error("Appointment {0} is already billed")]
    AlreadyBilled(String),

    /// The bill's status forbids the operation
    #[error("Invalid bill status for {operation}: {status}")]
    InvalidStatus {
        operation: &'static str,
        status: String,
    },

    /// Discount exceeds what the bill can absorb meaningfully
    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),

    /// Money arithmetic error
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Record parsing error
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Fee schedule configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}
