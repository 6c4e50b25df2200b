//! Bed record
//!
//! The bed holds a weak reference to its occupant (`patient_id` for
//! lookup, `patient_name` for display); the patient holds the bed
//! *number*. Neither owns the other; consistency between the two is
//! restored only by the transactional assign/discharge operations.

use core_kernel::{BedId, PatientId};
use serde::{Deserialize, Serialize};

use crate::collections;
use crate::record::Record;

/// Bed availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

/// A ward bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    pub id: BedId,
    pub number: String,
    pub ward: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub bed_type: Option<String>,
    pub status: BedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<PatientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
}

impl Record for Bed {
    const COLLECTION: &'static str = collections::BEDS;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Bed {
    /// A bed is assignable only when available with no patient reference
    pub fn is_available(&self) -> bool {
        self.status == BedStatus::Available && self.patient_id.is_none()
    }
}
