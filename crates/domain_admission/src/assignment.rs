//! Transactional bed assignment

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use core_kernel::{AppointmentId, BedId, Money, PatientId};
use domain_billing::FeeSchedule;
use domain_records::{collections, Appointment, Bed, Patient, Record};
use infra_store::{DocumentStore, Filter, Patch};

use crate::error::AdmissionError;

/// Service for admitting patients to beds
pub struct AdmissionService {
    store: Arc<dyn DocumentStore>,
    fees: FeeSchedule,
}

impl AdmissionService {
    /// Creates the service over a store handle and fee schedule
    pub fn new(store: Arc<dyn DocumentStore>, fees: FeeSchedule) -> Self {
        Self { store, fees }
    }

    /// Atomically links a bed, a patient, and an appointment's bed request
    ///
    /// All preconditions are checked inside one transaction: the bed must
    /// be available, the patient must exist, and the appointment must
    /// carry a pending bed request. On success the transaction commits
    /// exactly three writes; any precondition failure aborts with no
    /// partial state. A prior discharge is reset here, which is what makes
    /// re-admission work.
    ///
    /// `rate_per_day` defaults to the fee schedule's bed rate.
    #[instrument(skip(self))]
    pub async fn assign_bed(
        &self,
        bed_id: BedId,
        patient_id: PatientId,
        appointment_id: AppointmentId,
        rate_per_day: Option<Money>,
    ) -> Result<(), AdmissionError> {
        let rate = rate_per_day.unwrap_or(self.fees.default_bed_rate_per_day);
        let mut tx = self.store.begin().await?;

        let bed_doc = tx
            .get(collections::BEDS, &bed_id.to_string())
            .await?
            .ok_or_else(|| AdmissionError::BedNotFound(bed_id.to_string()))?;
        let bed = Bed::from_document(&bed_doc)?;
        if !bed.is_available() {
            return Err(AdmissionError::BedUnavailable {
                bed: bed.number,
                status: format!("{:?}", bed.status).to_lowercase(),
            });
        }

        let patient_doc = tx
            .get(collections::PATIENTS, &patient_id.to_string())
            .await?
            .ok_or_else(|| AdmissionError::PatientNotFound(patient_id.to_string()))?;
        let patient = Patient::from_document(&patient_doc)?;

        let appointment_doc = tx
            .get(collections::APPOINTMENTS, &appointment_id.to_string())
            .await?
            .ok_or_else(|| AdmissionError::AppointmentNotFound(appointment_id.to_string()))?;
        let appointment = Appointment::from_document(&appointment_doc)?;
        if !appointment.has_pending_bed_request() {
            return Err(AdmissionError::NoPendingBedRequest(
                appointment_id.to_string(),
            ));
        }

        let now = Utc::now();
        tx.update(
            collections::BEDS,
            &bed_id.to_string(),
            Patch::new()
                .set("status", json!("occupied"))
                .set("patientId", json!(patient_id))
                .set("patientName", json!(patient.name)),
        );
        tx.update(
            collections::PATIENTS,
            &patient_id.to_string(),
            Patch::new()
                .set("status", json!("admitted"))
                .set("assignedBed", json!(bed.number))
                .set("admissionDate", json!(now.to_rfc3339()))
                .set("bedAssignedAt", json!(now.to_rfc3339()))
                .set_record("bedRatePerDay", &rate)?
                // Reset any prior discharge so re-admission starts clean
                .set("dischargeInitiated", json!(false))
                .set("dischargeCompleted", json!(false))
                .unset("dischargeInitiatedBy")
                .unset("dischargeInitiatedAt")
                .unset("dischargeCompletedAt"),
        );
        tx.update(
            collections::APPOINTMENTS,
            &appointment_id.to_string(),
            Patch::new().set("bedRequestStatus", json!("approved")),
        );
        tx.commit().await?;

        info!(bed = %bed_id, patient = %patient_id, rate = %rate, "bed assigned");
        Ok(())
    }

    /// Lists non-cancelled appointments whose bed request awaits approval
    pub async fn get_pending_bed_requests(&self) -> Result<Vec<Appointment>, AdmissionError> {
        let filter = Filter::new()
            .field_eq("bedRequested", json!(true))
            .field_eq("bedRequestStatus", json!("pending"))
            .field_ne("status", json!("cancelled"));
        let docs = self.store.query(collections::APPOINTMENTS, &filter).await?;
        docs.iter()
            .map(|doc| Appointment::from_document(doc).map_err(AdmissionError::from))
            .collect()
    }
}
