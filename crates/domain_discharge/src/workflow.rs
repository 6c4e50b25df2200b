//! Discharge workflow
//!
//! Initiation is a single-document write; finalization is the system's
//! one all-or-nothing operation. Finalization re-validates every
//! precondition inside the transaction, not just before it, so two
//! receptionists acting on the same patient cannot both commit.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, instrument};

use core_kernel::{BillId, PatientId, StaffId};
use domain_billing::{Bill, BillItem};
use domain_records::{collections, Bed, Patient, Record};
use infra_store::{strip_nulls_deep, DocumentStore, Filter, Patch, StoreTransaction};

use crate::error::DischargeError;
use crate::expense::DischargeExpenseAggregation;

/// Result of a finalized discharge
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeOutcome {
    pub bill_id: BillId,
    pub bill_number: String,
}

/// Service for the discharge state machine
pub struct DischargeService {
    store: Arc<dyn DocumentStore>,
}

impl DischargeService {
    /// Creates the service over a store handle
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Marks an admitted patient as discharge-initiated
    ///
    /// Doctor-side step; billing and finalization remain pending until a
    /// receptionist completes them.
    #[instrument(skip(self))]
    pub async fn initiate_discharge(
        &self,
        patient_id: PatientId,
        doctor_id: StaffId,
    ) -> Result<(), DischargeError> {
        let pid = patient_id.to_string();
        let doc = self
            .store
            .get(collections::PATIENTS, &pid)
            .await?
            .ok_or_else(|| DischargeError::PatientNotFound(pid.clone()))?;
        let patient = Patient::from_document(&doc)?;

        if !patient.is_admitted() {
            return Err(DischargeError::NotAdmitted {
                patient: pid,
                status: format!("{:?}", patient.status).to_lowercase(),
            });
        }
        if patient.discharge_initiated {
            return Err(DischargeError::AlreadyInitiated(pid));
        }

        let patch = Patch::new()
            .set("dischargeInitiated", json!(true))
            .set("dischargeInitiatedBy", json!(doctor_id.to_string()))
            .set("dischargeInitiatedAt", json!(Utc::now().to_rfc3339()));
        self.store
            .update(collections::PATIENTS, &pid, patch)
            .await?;
        info!(patient = %patient_id, doctor = %doctor_id, "discharge initiated");
        Ok(())
    }

    /// Lists patients awaiting discharge billing
    pub async fn get_discharge_ready_patients(&self) -> Result<Vec<Patient>, DischargeError> {
        let filter = Filter::new()
            .field_eq("status", json!("admitted"))
            .field_eq("dischargeInitiated", json!(true))
            .field_ne("dischargeCompleted", json!(true));
        let docs = self.store.query(collections::PATIENTS, &filter).await?;
        docs.iter()
            .map(|d| Patient::from_document(d).map_err(DischargeError::from))
            .collect()
    }

    /// Finalizes a discharge: one transaction creating the paid bill,
    /// discharging the patient, and freeing the bed
    ///
    /// Payment is collected before this call; the bill is created already
    /// paid. Any precondition failure inside the transaction aborts all
    /// three writes, so the operation is safely re-runnable after the
    /// underlying condition is corrected.
    #[instrument(skip(self, expenses, payment_details))]
    pub async fn finalize_discharge_with_billing(
        &self,
        patient_id: PatientId,
        expenses: &DischargeExpenseAggregation,
        payment_method: &str,
        payment_details: Option<Value>,
        receptionist_id: StaffId,
    ) -> Result<DischargeOutcome, DischargeError> {
        let pid = patient_id.to_string();
        let mut tx = self.store.begin().await?;

        let patient_doc = tx
            .get(collections::PATIENTS, &pid)
            .await?
            .ok_or_else(|| DischargeError::PatientNotFound(pid.clone()))?;
        let patient = Patient::from_document(&patient_doc)?;
        if !patient.is_admitted() {
            return Err(DischargeError::NotAdmitted {
                patient: pid,
                status: format!("{:?}", patient.status).to_lowercase(),
            });
        }
        if !patient.discharge_initiated {
            return Err(DischargeError::NotInitiated(pid));
        }
        if patient.discharge_completed {
            return Err(DischargeError::AlreadyCompleted(pid));
        }

        let bed = self.resolve_bed(&mut tx, &patient).await?;

        let mut bill = Bill::new(patient_id, expenses.tax_rate);
        bill.patient_name = Some(patient.name.clone());
        bill.uhid = Some(patient.uhid.clone());
        bill.created_by = Some(receptionist_id);
        for expense in &expenses.items {
            // Totals are taken as aggregated: informational lines carry a
            // zero total regardless of their unit price.
            bill.items.push(BillItem {
                description: expense.description.clone(),
                service_type: expense.service_type,
                quantity: expense.quantity,
                unit_price: expense.unit_price,
                total: expense.total,
                linked_to: expense.linked_to.clone(),
            });
        }
        bill.recalculate_totals();
        bill.mark_paid(
            payment_method,
            payment_details.map(strip_nulls_deep),
            receptionist_id,
        );

        let now = Utc::now();
        tx.set(collections::BILLS, bill.to_document()?);
        tx.update(
            collections::PATIENTS,
            &pid,
            Patch::new()
                .set("status", json!("discharged"))
                .set("dischargeCompleted", json!(true))
                .set("dischargeCompletedAt", json!(now.to_rfc3339()))
                .unset("assignedBed")
                .unset("bedAssignedAt")
                .unset("bedRatePerDay"),
        );
        tx.update(
            collections::BEDS,
            &bed.id.to_string(),
            Patch::new()
                .set("status", json!("available"))
                .unset("patientId")
                .unset("patientName"),
        );
        tx.commit().await?;

        info!(
            patient = %patient_id,
            bill_number = %bill.bill_number,
            total = %bill.total,
            "discharge finalized"
        );
        Ok(DischargeOutcome {
            bill_id: bill.id,
            bill_number: bill.bill_number,
        })
    }

    /// Resolves the patient's bed inside the transaction
    ///
    /// The bed's `patientId` back-reference is authoritative; a stale
    /// reference falls back to lookup by the bed number on the patient.
    async fn resolve_bed(
        &self,
        tx: &mut Box<dyn StoreTransaction>,
        patient: &Patient,
    ) -> Result<Bed, DischargeError> {
        let by_reference = Filter::new().field_eq("patientId", json!(patient.id));
        let mut docs = tx.query(collections::BEDS, &by_reference).await?;

        if docs.is_empty() {
            if let Some(number) = &patient.assigned_bed {
                let by_number = Filter::new().field_eq("number", json!(number));
                docs = tx.query(collections::BEDS, &by_number).await?;
            }
        }

        let doc = docs
            .first()
            .ok_or_else(|| DischargeError::BedNotFound(patient.id.to_string()))?;
        Ok(Bed::from_document(doc)?)
    }
}
