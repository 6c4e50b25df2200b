//! Expense aggregation
//!
//! Read-only and idempotent: the aggregator scans appointments, bills,
//! prescriptions, lab orders, the bed stay, and the patient's legacy
//! embedded charges, and unifies them into one de-duplicated list. A
//! single real-world charge must appear exactly once no matter how many
//! records reference it, which is what the `linked_to` and `appointmentId`
//! scanning below is for. De-duplication is heuristic, not referentially
//! enforced; see the workflow docs for the accepted inconsistency window.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, instrument};

use core_kernel::PatientId;
use domain_admission::calculate_bed_charges;
use domain_billing::{Bill, BillStatus, FeeSchedule};
use domain_records::{
    collections, Appointment, InventoryItem, LabOrder, Patient, Prescription, Record, ServiceType,
};
use infra_store::{DocumentStore, Filter};

use crate::error::DischargeError;
use crate::expense::{DischargeExpenseAggregation, DischargeExpenseItem, ExpenseSource};

/// Computes the unified charge list for a patient's discharge
pub struct ExpenseAggregator {
    store: Arc<dyn DocumentStore>,
    fees: FeeSchedule,
}

impl ExpenseAggregator {
    /// Creates the aggregator over a store handle and fee schedule
    pub fn new(store: Arc<dyn DocumentStore>, fees: FeeSchedule) -> Self {
        Self { store, fees }
    }

    /// Aggregates expenses as of now
    pub async fn aggregate_expenses(
        &self,
        patient_id: PatientId,
    ) -> Result<DischargeExpenseAggregation, DischargeError> {
        self.aggregate_expenses_at(patient_id, Utc::now()).await
    }

    /// Aggregates expenses with an explicit discharge instant, which fixes
    /// the bed-day count
    ///
    /// Reads only; calling this twice with no intervening writes yields
    /// identical totals.
    #[instrument(skip(self))]
    pub async fn aggregate_expenses_at(
        &self,
        patient_id: PatientId,
        discharge_at: DateTime<Utc>,
    ) -> Result<DischargeExpenseAggregation, DischargeError> {
        let pid = patient_id.to_string();
        let patient_doc = self
            .store
            .get(collections::PATIENTS, &pid)
            .await?
            .ok_or_else(|| DischargeError::PatientNotFound(pid.clone()))?;
        let patient = Patient::from_document(&patient_doc)?;

        let by_patient = Filter::new().field_eq("patientId", json!(patient_id));
        let appointments = self.completed_appointments(&by_patient).await?;
        let bills = self.patient_bills(&by_patient).await?;
        let (unpaid_bills, paid_bills): (Vec<_>, Vec<_>) = bills
            .into_iter()
            .filter(|b| b.status != BillStatus::Cancelled)
            .partition(|b| b.status != BillStatus::Paid);

        // Appointment ids already represented by a bill; appointments in
        // this set must not be charged again directly.
        let mut captured: HashSet<String> = HashSet::new();
        for bill in &unpaid_bills {
            if let Some(appointment_id) = bill.appointment_id {
                captured.insert(appointment_id.to_string());
            }
            for item in &bill.items {
                if let Some(linked) = &item.linked_to {
                    captured.insert(linked.clone());
                }
            }
        }
        let appointment_ids: HashSet<String> =
            appointments.iter().map(|a| a.id.to_string()).collect();

        let mut items = Vec::new();

        // Completed appointments not covered by any bill get a direct
        // consultation fee line.
        for appointment in &appointments {
            let id = appointment.id.to_string();
            if appointment.bill_id.is_some() || captured.contains(&id) {
                continue;
            }
            let fee = self
                .fees
                .consultation_fee(appointment.appointment_type, None);
            let doctor = appointment.doctor_name.as_deref().unwrap_or("Doctor");
            items.push(
                DischargeExpenseItem::new(
                    ExpenseSource::Appointment,
                    format!("Consultation - {doctor}"),
                    ServiceType::Consultation,
                    1,
                    fee,
                )
                .linked_to(id.clone()),
            );
            captured.insert(id);
        }

        // Unpaid bills are flattened item by item. Items tracing back to an
        // appointment keep that provenance for display.
        let mut flattened_bill_ids: HashSet<String> = HashSet::new();
        for bill in &unpaid_bills {
            flattened_bill_ids.insert(bill.id.to_string());
            for item in &bill.items {
                let from_appointment = item
                    .linked_to
                    .as_ref()
                    .is_some_and(|l| appointment_ids.contains(l))
                    || bill.appointment_id.is_some();
                let source = if from_appointment {
                    ExpenseSource::Appointment
                } else {
                    ExpenseSource::Bill
                };
                let mut line = DischargeExpenseItem::with_total(
                    source,
                    item.description.clone(),
                    item.service_type,
                    item.quantity,
                    item.unit_price,
                    item.total,
                );
                line.linked_to = item.linked_to.clone();
                items.push(line);
            }
        }

        // Pre-admission consultations already paid at the OPD desk stay
        // visible on the discharge invoice at zero charge.
        if patient.is_admitted() {
            for bill in &paid_bills {
                for item in &bill.items {
                    if item.service_type != ServiceType::Consultation {
                        continue;
                    }
                    let Some(appointment_id) = item
                        .linked_to
                        .clone()
                        .or_else(|| bill.appointment_id.map(|a| a.to_string()))
                    else {
                        continue;
                    };
                    if captured.contains(&appointment_id) {
                        continue;
                    }
                    let mut line = DischargeExpenseItem::informational(
                        ExpenseSource::Bill,
                        format!("{} (already paid)", item.description),
                        ServiceType::Consultation,
                        item.unit_price,
                        "(already paid)",
                    );
                    line.linked_to = Some(appointment_id.clone());
                    items.push(line);
                    captured.insert(appointment_id);
                }
            }
        }

        // Embedded legacy entries consumed by a later step must not
        // resurface in the final sweep.
        let mut consumed_embedded: HashSet<usize> = HashSet::new();

        self.add_prescription_items(&patient, &by_patient, &mut items, &mut consumed_embedded)
            .await?;
        self.add_lab_order_items(&by_patient, &mut items).await?;
        self.add_bed_charge_item(&patient, discharge_at, &mut items, &mut consumed_embedded);

        // Whatever legacy entries remain: unpaid, not the bed charge, not
        // mirrored by a bill already flattened above.
        for (index, entry) in patient.bills.iter().enumerate() {
            if entry.paid || entry.is_bed_charge() || consumed_embedded.contains(&index) {
                continue;
            }
            if entry
                .linked_bill_id
                .as_ref()
                .is_some_and(|id| flattened_bill_ids.contains(id))
            {
                continue;
            }
            items.push(DischargeExpenseItem::with_total(
                ExpenseSource::Other,
                entry.description.clone(),
                entry.service_type.unwrap_or(ServiceType::Other),
                1,
                entry.amount,
                entry.amount,
            ));
        }

        let aggregation = DischargeExpenseAggregation::from_items(items, self.fees.tax_rate);
        debug!(
            items = aggregation.items.len(),
            subtotal = %aggregation.subtotal,
            grand_total = %aggregation.grand_total,
            "expenses aggregated"
        );
        Ok(aggregation)
    }

    async fn completed_appointments(
        &self,
        by_patient: &Filter,
    ) -> Result<Vec<Appointment>, DischargeError> {
        let filter = by_patient.clone().field_eq("status", json!("completed"));
        let docs = self.store.query(collections::APPOINTMENTS, &filter).await?;
        docs.iter()
            .map(|d| Appointment::from_document(d).map_err(DischargeError::from))
            .collect()
    }

    async fn patient_bills(&self, by_patient: &Filter) -> Result<Vec<Bill>, DischargeError> {
        let docs = self.store.query(collections::BILLS, by_patient).await?;
        docs.iter()
            .map(|d| Bill::from_document(d).map_err(DischargeError::from))
            .collect()
    }

    /// Prices hospital-dispensed prescriptions
    ///
    /// An exact legacy embedded price wins over an inventory lookup; a
    /// medicine missing from inventory degrades to a flagged zero-priced
    /// line rather than a silent omission.
    async fn add_prescription_items(
        &self,
        patient: &Patient,
        by_patient: &Filter,
        items: &mut Vec<DischargeExpenseItem>,
        consumed_embedded: &mut HashSet<usize>,
    ) -> Result<(), DischargeError> {
        let docs = self
            .store
            .query(collections::PRESCRIPTIONS, by_patient)
            .await?;
        let prescriptions: Vec<Prescription> = docs
            .iter()
            .map(|d| Prescription::from_document(d).map_err(DischargeError::from))
            .collect::<Result<_, _>>()?;
        let chargeable: Vec<&Prescription> =
            prescriptions.iter().filter(|p| p.is_chargeable()).collect();
        if chargeable.is_empty() {
            return Ok(());
        }

        let inventory_docs = self
            .store
            .query(collections::INVENTORY, &Filter::new())
            .await?;
        let inventory: Vec<InventoryItem> = inventory_docs
            .iter()
            .map(|d| InventoryItem::from_document(d).map_err(DischargeError::from))
            .collect::<Result<_, _>>()?;

        for prescription in chargeable {
            if let Some((index, entry)) = patient.bills.iter().enumerate().find(|(i, e)| {
                !e.paid
                    && !consumed_embedded.contains(i)
                    && e.service_type == Some(ServiceType::Medicine)
                    && prescription.medicines.iter().any(|m| {
                        e.description.to_lowercase().contains(&m.name.to_lowercase())
                    })
            }) {
                consumed_embedded.insert(index);
                items.push(
                    DischargeExpenseItem::with_total(
                        ExpenseSource::Prescription,
                        entry.description.clone(),
                        ServiceType::Medicine,
                        1,
                        entry.amount,
                        entry.amount,
                    )
                    .linked_to(prescription.id.to_string()),
                );
                continue;
            }

            for medicine in &prescription.medicines {
                match inventory.iter().find(|i| i.matches_name(&medicine.name)) {
                    Some(stock_item) => items.push(
                        DischargeExpenseItem::new(
                            ExpenseSource::Prescription,
                            format!("{} x {}", medicine.name, medicine.quantity),
                            ServiceType::Medicine,
                            medicine.quantity,
                            stock_item.unit_price,
                        )
                        .linked_to(prescription.id.to_string()),
                    ),
                    None => items.push(
                        DischargeExpenseItem::unpriced(
                            ExpenseSource::Prescription,
                            format!("{} x {}", medicine.name, medicine.quantity),
                            ServiceType::Medicine,
                            medicine.quantity,
                        )
                        .linked_to(prescription.id.to_string()),
                    ),
                }
            }
        }
        Ok(())
    }

    async fn add_lab_order_items(
        &self,
        by_patient: &Filter,
        items: &mut Vec<DischargeExpenseItem>,
    ) -> Result<(), DischargeError> {
        let docs = self.store.query(collections::LAB_ORDERS, by_patient).await?;
        for doc in &docs {
            let order = LabOrder::from_document(doc)?;
            if !order.is_chargeable() {
                continue;
            }
            items.push(
                DischargeExpenseItem::with_total(
                    ExpenseSource::LabOrder,
                    format!("Lab Tests: {}", order.tests_summary()),
                    ServiceType::LabTest,
                    1,
                    order.total_amount,
                    order.total_amount,
                )
                .linked_to(order.id.to_string()),
            );
        }
        Ok(())
    }

    /// Adds the bed charge for the current stay
    ///
    /// A legacy embedded "Bed Charge" entry carries the exact agreed price
    /// and wins over the computed day count.
    fn add_bed_charge_item(
        &self,
        patient: &Patient,
        discharge_at: DateTime<Utc>,
        items: &mut Vec<DischargeExpenseItem>,
        consumed_embedded: &mut HashSet<usize>,
    ) {
        if patient.assigned_bed.is_none() || patient.bed_assigned_at.is_none() {
            return;
        }

        if let Some((index, entry)) = patient
            .bills
            .iter()
            .enumerate()
            .find(|(i, e)| !e.paid && e.is_bed_charge() && !consumed_embedded.contains(i))
        {
            consumed_embedded.insert(index);
            items.push(DischargeExpenseItem::with_total(
                ExpenseSource::Bed,
                entry.description.clone(),
                ServiceType::BedCharge,
                1,
                entry.amount,
                entry.amount,
            ));
            return;
        }

        if let Some(charge) =
            calculate_bed_charges(patient, discharge_at, self.fees.default_bed_rate_per_day)
        {
            items.push(DischargeExpenseItem::new(
                ExpenseSource::Bed,
                format!(
                    "Bed Charge ({} day{} @ {}/day)",
                    charge.days,
                    if charge.days == 1 { "" } else { "s" },
                    charge.rate_per_day
                ),
                ServiceType::BedCharge,
                charge.days,
                charge.rate_per_day,
            ));
        }
    }
}
