//! Discharge domain errors

use domain_records::RecordError;
use infra_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the discharge domain
#[derive(Debug, Error)]
pub enum DischargeError {
    /// Patient not found
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// The patient is not currently admitted
    #[error("Patient {patient} is not admitted (status: {status})")]
    NotAdmitted { patient: String, status: String },

    /// A doctor has not initiated discharge yet
    #[error("Discharge has not been initiated for patient {0}")]
    NotInitiated(String),

    /// Discharge was already initiated
    #[error("Discharge already initiated for patient {0}")]
    AlreadyInitiated(String),

    /// Discharge was already completed
    #[error("Discharge already completed for patient {0}")]
    AlreadyCompleted(String),

    /// The patient's bed could not be resolved
    #[error("No bed found for patient {0}")]
    BedNotFound(String),

    /// Record parsing error
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),
}
