//! Admission domain errors
//!
//! Precondition violations inside the assignment transaction abort it
//! before any write is staged, so every variant here implies no partial
//! state was left behind.

use domain_records::RecordError;
use infra_store::StoreError;
use thiserror::Error;

/// Errors that can occur during bed assignment
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Bed not found
    #[error("Bed not found: {0}")]
    BedNotFound(String),

    /// Bed exists but cannot be assigned
    #[error("Bed {bed} is not available (status: {status})")]
    BedUnavailable { bed: String, status: String },

    /// Patient not found
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// Appointment not found
    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    /// The appointment has no bed request awaiting approval
    #[error("Appointment {0} has no pending bed request")]
    NoPendingBedRequest(String),

    /// Record parsing error
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),
}
