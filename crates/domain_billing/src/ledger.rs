//! OPD billing ledger
//!
//! Per-visit billing operations, independent of the discharge workflow.
//! Each operation is a single-document write: a payment can succeed while
//! a related appointment update fails, which is an accepted inconsistency
//! window compensated for by the expense aggregator's de-duplication.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use core_kernel::{BillId, PatientId, StaffId};
use domain_records::{collections, Appointment, Patient, Record, ServiceType};
use infra_store::{strip_nulls_deep, DocumentStore, Patch};

use crate::bill::{Bill, BillItem, BillStatus};
use crate::error::BillingError;
use crate::fees::FeeSchedule;

/// Service for OPD bill creation and payment
pub struct BillingLedger {
    store: Arc<dyn DocumentStore>,
    fees: FeeSchedule,
}

impl BillingLedger {
    /// Creates a ledger over a store handle and fee schedule
    pub fn new(store: Arc<dyn DocumentStore>, fees: FeeSchedule) -> Self {
        Self { store, fees }
    }

    /// Returns the fee schedule in use
    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Loads a bill by id
    pub async fn get_bill(&self, bill_id: BillId) -> Result<Bill, BillingError> {
        let doc = self
            .store
            .get(collections::BILLS, &bill_id.to_string())
            .await?
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))?;
        Ok(Bill::from_document(&doc)?)
    }

    /// Generates a pending OPD bill for a completed appointment
    ///
    /// The consultation fee is looked up from the schedule by appointment
    /// type and doctor specialization. After the bill document is created,
    /// the appointment is stamped with the `billId` back-reference; that
    /// second write is best-effort and non-transactional.
    #[instrument(skip(self, appointment, patient), fields(appointment_id = %appointment.id))]
    pub async fn generate_bill_from_appointment(
        &self,
        appointment: &Appointment,
        patient: &Patient,
        doctor_specialization: Option<&str>,
        created_by: StaffId,
    ) -> Result<Bill, BillingError> {
        if let Some(existing) = appointment.bill_id {
            return Err(BillingError::AlreadyBilled(existing.to_string()));
        }

        let fee = self
            .fees
            .consultation_fee(appointment.appointment_type, doctor_specialization);

        let mut bill = Bill::new(appointment.patient_id, self.fees.tax_rate);
        bill.patient_name = Some(patient.name.clone());
        bill.uhid = Some(patient.uhid.clone());
        bill.appointment_id = Some(appointment.id);
        bill.status = BillStatus::Pending;
        bill.created_by = Some(created_by);

        let doctor = appointment.doctor_name.as_deref().unwrap_or("Doctor");
        bill.add_item(
            BillItem::new(
                format!("Consultation - {doctor}"),
                ServiceType::Consultation,
                1,
                fee,
            )
            .linked_to(appointment.id.to_string()),
        );

        self.store
            .insert(collections::BILLS, bill.to_document()?)
            .await?;
        info!(bill_number = %bill.bill_number, total = %bill.total, "OPD bill created");

        // Best-effort back-reference; aggregation de-duplication covers
        // the case where this write is lost.
        let stamp = Patch::new().set("billId", json!(bill.id.to_string()));
        if let Err(e) = self
            .store
            .update(collections::APPOINTMENTS, &appointment.id.to_string(), stamp)
            .await
        {
            warn!(error = %e, "failed to stamp billId on appointment");
        }

        Ok(bill)
    }

    /// Applies a discount to a bill, recomputing its total
    #[instrument(skip(self))]
    pub async fn apply_discount(
        &self,
        bill_id: BillId,
        amount: core_kernel::Money,
        reason: &str,
    ) -> Result<(), BillingError> {
        if amount.is_negative() {
            return Err(BillingError::InvalidDiscount(format!(
                "discount cannot be negative: {amount}"
            )));
        }

        let mut bill = self.get_bill(bill_id).await?;
        if matches!(bill.status, BillStatus::Paid | BillStatus::Cancelled) {
            return Err(BillingError::InvalidStatus {
                operation: "apply_discount",
                status: bill.status.to_string(),
            });
        }

        bill.apply_discount(amount, reason);

        let patch = Patch::new()
            .set_record("discount", &bill.discount)?
            .set("discountReason", json!(reason))
            .set_record("tax", &bill.tax)?
            .set_record("total", &bill.total)?
            .set("updatedAt", json!(Utc::now().to_rfc3339()));
        self.store
            .update(collections::BILLS, &bill_id.to_string(), patch)
            .await?;
        info!(total = %bill.total, "discount applied");
        Ok(())
    }

    /// Records payment on a bill
    ///
    /// Free-form payment details are cleaned of null values before being
    /// persisted; the underlying store rejects undefined field values.
    #[instrument(skip(self, details))]
    pub async fn process_bill_payment(
        &self,
        bill_id: BillId,
        method: &str,
        details: Option<Value>,
        paid_by: StaffId,
    ) -> Result<(), BillingError> {
        let bill = self.get_bill(bill_id).await?;
        if matches!(bill.status, BillStatus::Paid | BillStatus::Cancelled) {
            return Err(BillingError::InvalidStatus {
                operation: "process_bill_payment",
                status: bill.status.to_string(),
            });
        }

        let now = Utc::now();
        let mut patch = Patch::new()
            .set("status", json!("paid"))
            .set("paymentMethod", json!(method))
            .set("paidAt", json!(now.to_rfc3339()))
            .set("paidBy", json!(paid_by.to_string()))
            .set("updatedAt", json!(now.to_rfc3339()));
        if let Some(details) = details {
            patch = patch.set("paymentDetails", strip_nulls_deep(details));
        }

        self.store
            .update(collections::BILLS, &bill_id.to_string(), patch)
            .await?;
        info!(bill_number = %bill.bill_number, "bill paid");
        Ok(())
    }

    /// Moves a patient's legacy embedded charges into the bills collection
    ///
    /// One bill per embedded entry, created in a single transaction with
    /// the removal of the embedded array, so the patient never ends up
    /// half-migrated. Entries that already mirror a normalized bill
    /// (`linked_bill_id` set) are dropped rather than duplicated. Returns
    /// the number of bills created.
    #[instrument(skip(self))]
    pub async fn migrate_embedded_bills(
        &self,
        patient_id: PatientId,
    ) -> Result<usize, BillingError> {
        let pid = patient_id.to_string();
        let mut tx = self.store.begin().await?;

        let doc = tx
            .get(collections::PATIENTS, &pid)
            .await?
            .ok_or_else(|| BillingError::PatientNotFound(pid.clone()))?;
        let patient = Patient::from_document(&doc)?;
        if patient.bills.is_empty() {
            return Ok(0);
        }

        let mut migrated = 0;
        for entry in &patient.bills {
            if entry.linked_bill_id.is_some() {
                continue;
            }
            let mut bill = Bill::new(patient_id, self.fees.tax_rate);
            bill.patient_name = Some(patient.name.clone());
            bill.uhid = Some(patient.uhid.clone());
            bill.add_item(BillItem::new(
                entry.description.clone(),
                entry.service_type.unwrap_or(ServiceType::Other),
                1,
                entry.amount,
            ));
            bill.status = if entry.paid {
                BillStatus::Paid
            } else {
                BillStatus::Pending
            };
            tx.set(collections::BILLS, bill.to_document()?);
            migrated += 1;
        }

        tx.update(collections::PATIENTS, &pid, Patch::new().unset("bills"));
        tx.commit().await?;
        info!(patient = %patient_id, migrated, "embedded bills migrated");
        Ok(migrated)
    }
}
