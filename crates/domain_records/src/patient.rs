//! Patient record
//!
//! The patient is the aggregation root for discharge: its status, bed
//! fields, and discharge flags drive the whole workflow. The legacy
//! embedded `bills` array predates the normalized `bills` collection and
//! survives only as a reconciliation source for the expense aggregator.

use chrono::{DateTime, Utc};
use core_kernel::temporal::{store_timestamp, store_timestamp_opt};
use core_kernel::{Money, PatientId, StaffId, Uhid};
use serde::{Deserialize, Serialize};

use crate::collections;
use crate::record::Record;
use crate::service::ServiceType;

/// Patient lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Admitted,
    Discharged,
    Critical,
    Stable,
}

/// A legacy charge embedded directly on the patient document
///
/// Newer code writes to the `bills` collection instead; these entries are
/// reconciled (never double-counted) during expense aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedBill {
    pub description: String,
    pub amount: Money,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    /// Set when the entry mirrors a document in the `bills` collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_bill_id: Option<String>,
}

impl EmbeddedBill {
    /// True for entries recording the bed charge of the current stay
    pub fn is_bed_charge(&self) -> bool {
        self.service_type == Some(ServiceType::BedCharge)
            || self.description.to_lowercase().contains("bed charge")
    }
}

/// A registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub uhid: Uhid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: PatientStatus,

    /// Bed *number* (display/lookup only; the bed document is authoritative)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_bed: Option<String>,
    #[serde(default, with = "store_timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub bed_assigned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bed_rate_per_day: Option<Money>,
    #[serde(default, with = "store_timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub discharge_initiated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_initiated_by: Option<StaffId>,
    #[serde(default, with = "store_timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub discharge_initiated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discharge_completed: bool,
    #[serde(default, with = "store_timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub discharge_completed_at: Option<DateTime<Utc>>,

    /// Legacy ad-hoc charges; see [`EmbeddedBill`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bills: Vec<EmbeddedBill>,

    #[serde(with = "store_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Record for Patient {
    const COLLECTION: &'static str = collections::PATIENTS;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Patient {
    /// True when a doctor has initiated discharge but billing is pending
    pub fn is_discharge_ready(&self) -> bool {
        self.status == PatientStatus::Admitted
            && self.discharge_initiated
            && !self.discharge_completed
    }

    /// True while the patient occupies a bed
    pub fn is_admitted(&self) -> bool {
        self.status == PatientStatus::Admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra_store::Document;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parses_store_document_with_timestamp_variants() {
        let data = json!({
            "uhid": "UHID-202403-00007",
            "name": "Asha Rao",
            "status": "admitted",
            "assignedBed": "101",
            "bedAssignedAt": {"seconds": 1710496800},
            "bedRatePerDay": {"amount": "1000", "currency": "INR"},
            "dischargeInitiated": true,
            "createdAt": "2024-03-01T08:00:00Z"
        });
        let doc = Document::new(
            PatientId::new().to_string(),
            data.as_object().unwrap().clone(),
        );

        let patient = Patient::from_document(&doc).unwrap();
        assert_eq!(patient.status, PatientStatus::Admitted);
        assert_eq!(patient.assigned_bed.as_deref(), Some("101"));
        assert_eq!(patient.bed_assigned_at.unwrap().timestamp(), 1710496800);
        assert_eq!(patient.bed_rate_per_day.unwrap().amount(), dec!(1000));
        assert!(patient.is_discharge_ready());
    }

    #[test]
    fn test_rejects_unknown_status() {
        let data = json!({
            "uhid": "UHID-202403-00007",
            "name": "Asha Rao",
            "status": "resting",
            "createdAt": "2024-03-01T08:00:00Z"
        });
        let doc = Document::new(
            PatientId::new().to_string(),
            data.as_object().unwrap().clone(),
        );

        assert!(matches!(
            Patient::from_document(&doc),
            Err(crate::RecordError::Malformed { collection: "patients", .. })
        ));
    }

    #[test]
    fn test_embedded_bill_bed_charge_detection() {
        let by_type = EmbeddedBill {
            description: "Stay".to_string(),
            amount: Money::inr(dec!(400)),
            paid: false,
            service_type: Some(ServiceType::BedCharge),
            linked_bill_id: None,
        };
        let by_description = EmbeddedBill {
            description: "Bed Charge (2 days)".to_string(),
            amount: Money::inr(dec!(400)),
            paid: false,
            service_type: None,
            linked_bill_id: None,
        };

        assert!(by_type.is_bed_charge());
        assert!(by_description.is_bed_charge());
    }
}
