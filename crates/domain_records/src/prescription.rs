//! Prescription record

use chrono::{DateTime, Utc};
use core_kernel::temporal::store_timestamp;
use core_kernel::{PatientId, PrescriptionId, StaffId};
use serde::{Deserialize, Serialize};

use crate::collections;
use crate::record::Record;

/// Prescription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Pending,
    Approved,
    Dispensed,
    Rejected,
}

/// One prescribed medicine line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedMedicine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    pub quantity: u32,
}

/// A doctor's prescription
///
/// Only prescriptions dispensed from the hospital pharmacy are
/// chargeable at discharge; externally filled ones are the patient's
/// own expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: PrescriptionId,
    pub patient_id: PatientId,
    pub doctor_id: StaffId,
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub dispensed_from_hospital: bool,
    pub medicines: Vec<PrescribedMedicine>,
    #[serde(with = "store_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Record for Prescription {
    const COLLECTION: &'static str = collections::PRESCRIPTIONS;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Prescription {
    /// True when the prescription should appear on the discharge invoice
    pub fn is_chargeable(&self) -> bool {
        self.dispensed_from_hospital
            && matches!(
                self.status,
                PrescriptionStatus::Approved | PrescriptionStatus::Dispensed
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prescription(status: PrescriptionStatus, from_hospital: bool) -> Prescription {
        Prescription {
            id: PrescriptionId::new(),
            patient_id: PatientId::new(),
            doctor_id: StaffId::new(),
            status,
            dispensed_from_hospital: from_hospital,
            medicines: vec![PrescribedMedicine {
                name: "Paracetamol 500mg".to_string(),
                dosage: Some("1-0-1".to_string()),
                quantity: 10,
            }],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_chargeable_statuses() {
        assert!(prescription(PrescriptionStatus::Approved, true).is_chargeable());
        assert!(prescription(PrescriptionStatus::Dispensed, true).is_chargeable());
        assert!(!prescription(PrescriptionStatus::Pending, true).is_chargeable());
        assert!(!prescription(PrescriptionStatus::Rejected, true).is_chargeable());
        assert!(!prescription(PrescriptionStatus::Dispensed, false).is_chargeable());
    }
}
