//! Billing ledger integration tests against the in-memory store

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::{Money, PatientId, Rate, StaffId, Uhid};
use domain_billing::{Bill, BillingError, BillingLedger, BillStatus, FeeSchedule};
use domain_records::{
    collections, Appointment, AppointmentStatus, AppointmentType, EmbeddedBill, Patient,
    PatientStatus, Record,
};
use infra_store::{DocumentStore, Filter, MemoryStore};

fn patient() -> Patient {
    Patient {
        id: PatientId::new(),
        uhid: Uhid::generate(Utc::now(), 1),
        name: "Ravi Kumar".to_string(),
        age: Some(42),
        gender: None,
        phone: None,
        status: PatientStatus::Stable,
        assigned_bed: None,
        bed_assigned_at: None,
        bed_rate_per_day: None,
        admission_date: None,
        discharge_initiated: false,
        discharge_initiated_by: None,
        discharge_initiated_at: None,
        discharge_completed: false,
        discharge_completed_at: None,
        bills: Vec::new(),
        created_at: Utc::now(),
    }
}

fn completed_appointment(patient: &Patient, appointment_type: AppointmentType) -> Appointment {
    Appointment {
        id: core_kernel::AppointmentId::new(),
        patient_id: patient.id,
        patient_name: Some(patient.name.clone()),
        doctor_id: StaffId::new(),
        doctor_name: Some("Dr. Mehta".to_string()),
        appointment_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        time_slot: "09:00-09:30".parse().unwrap(),
        appointment_type,
        status: AppointmentStatus::Completed,
        queue_number: 1,
        bill_id: None,
        bed_requested: false,
        bed_request_status: None,
        created_at: Utc::now(),
    }
}

async fn seeded_ledger() -> (Arc<MemoryStore>, BillingLedger) {
    let store = Arc::new(MemoryStore::new());
    let ledger = BillingLedger::new(store.clone(), FeeSchedule::default());
    (store, ledger)
}

#[tokio::test]
async fn generate_bill_prices_by_type_and_stamps_appointment() {
    let (store, ledger) = seeded_ledger().await;
    let patient = patient();
    let appointment = completed_appointment(&patient, AppointmentType::Emergency);
    store
        .insert(collections::APPOINTMENTS, appointment.to_document().unwrap())
        .await
        .unwrap();

    let bill = ledger
        .generate_bill_from_appointment(&appointment, &patient, None, StaffId::new())
        .await
        .unwrap();

    assert_eq!(bill.status, BillStatus::Pending);
    assert_eq!(bill.total, Money::inr(dec!(1200)));
    assert_eq!(bill.appointment_id, Some(appointment.id));
    assert!(bill.totals_consistent());

    // billId back-reference lands on the appointment document
    let stamped = store
        .get(collections::APPOINTMENTS, &appointment.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stamped.field("billId"),
        Some(&json!(bill.id.to_string()))
    );
}

#[tokio::test]
async fn generate_bill_uses_specialist_rate() {
    let (store, ledger) = seeded_ledger().await;
    let patient = patient();
    let appointment = completed_appointment(&patient, AppointmentType::Consultation);
    store
        .insert(collections::APPOINTMENTS, appointment.to_document().unwrap())
        .await
        .unwrap();

    let bill = ledger
        .generate_bill_from_appointment(&appointment, &patient, Some("Cardiology"), StaffId::new())
        .await
        .unwrap();
    assert_eq!(bill.total, Money::inr(dec!(800)));
}

#[tokio::test]
async fn generate_bill_rejects_already_billed_appointment() {
    let (_store, ledger) = seeded_ledger().await;
    let patient = patient();
    let mut appointment = completed_appointment(&patient, AppointmentType::Consultation);
    appointment.bill_id = Some(core_kernel::BillId::new());

    let err = ledger
        .generate_bill_from_appointment(&appointment, &patient, None, StaffId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::AlreadyBilled(_)));
}

#[tokio::test]
async fn apply_discount_recomputes_and_clamps_total() {
    let (store, ledger) = seeded_ledger().await;
    let mut bill = Bill::new(PatientId::new(), Rate::zero());
    bill.add_item(domain_billing::BillItem::new(
        "Consultation",
        domain_records::ServiceType::Consultation,
        1,
        Money::inr(dec!(500)),
    ));
    bill.status = BillStatus::Pending;
    store
        .insert(collections::BILLS, bill.to_document().unwrap())
        .await
        .unwrap();

    ledger
        .apply_discount(bill.id, Money::inr(dec!(200)), "Camp discount")
        .await
        .unwrap();
    let updated = ledger.get_bill(bill.id).await.unwrap();
    assert_eq!(updated.total, Money::inr(dec!(300)));
    assert!(updated.totals_consistent());

    // A discount larger than the bill clamps at zero instead of going
    // negative.
    ledger
        .apply_discount(bill.id, Money::inr(dec!(900)), "Full waiver")
        .await
        .unwrap();
    let waived = ledger.get_bill(bill.id).await.unwrap();
    assert_eq!(waived.total, Money::zero(Default::default()));
    assert!(waived.totals_consistent());
}

#[tokio::test]
async fn process_payment_strips_null_details() {
    let (store, ledger) = seeded_ledger().await;
    let mut bill = Bill::new(PatientId::new(), Rate::zero());
    bill.add_item(domain_billing::BillItem::new(
        "Consultation",
        domain_records::ServiceType::Consultation,
        1,
        Money::inr(dec!(500)),
    ));
    bill.status = BillStatus::Pending;
    store
        .insert(collections::BILLS, bill.to_document().unwrap())
        .await
        .unwrap();

    let details = json!({
        "cardLast4": "4242",
        "upiId": null,
        "approvalCode": null
    });
    ledger
        .process_bill_payment(bill.id, "card", Some(details), StaffId::new())
        .await
        .unwrap();

    let paid = ledger.get_bill(bill.id).await.unwrap();
    assert_eq!(paid.status, BillStatus::Paid);
    assert!(paid.paid_at.is_some());
    let stored_details = paid.payment_details.unwrap();
    assert_eq!(stored_details, json!({"cardLast4": "4242"}));
}

#[tokio::test]
async fn process_payment_rejects_paid_bill() {
    let (store, ledger) = seeded_ledger().await;
    let mut bill = Bill::new(PatientId::new(), Rate::zero());
    bill.mark_paid("cash", None, StaffId::new());
    store
        .insert(collections::BILLS, bill.to_document().unwrap())
        .await
        .unwrap();

    let err = ledger
        .process_bill_payment(bill.id, "cash", None, StaffId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::InvalidStatus { .. }));
}

#[tokio::test]
async fn migrate_embedded_bills_normalizes_legacy_entries() {
    let (store, ledger) = seeded_ledger().await;
    let mut patient = patient();
    patient.bills = vec![
        EmbeddedBill {
            description: "Dressing change".to_string(),
            amount: Money::inr(dec!(250)),
            paid: false,
            service_type: Some(domain_records::ServiceType::Procedure),
            linked_bill_id: None,
        },
        EmbeddedBill {
            description: "Old consultation".to_string(),
            amount: Money::inr(dec!(500)),
            paid: true,
            service_type: None,
            linked_bill_id: None,
        },
        // Already mirrored by a normalized bill; must not be duplicated.
        EmbeddedBill {
            description: "Consultation - Dr. Mehta".to_string(),
            amount: Money::inr(dec!(500)),
            paid: false,
            service_type: None,
            linked_bill_id: Some(core_kernel::BillId::new().to_string()),
        },
    ];
    store
        .insert(collections::PATIENTS, patient.to_document().unwrap())
        .await
        .unwrap();

    let migrated = ledger.migrate_embedded_bills(patient.id).await.unwrap();
    assert_eq!(migrated, 2);

    // The embedded array is gone and the entries now live as bills.
    let patient_after = Patient::from_document(
        &store
            .get(collections::PATIENTS, &patient.id.to_string())
            .await
            .unwrap()
            .unwrap(),
    )
    .unwrap();
    assert!(patient_after.bills.is_empty());

    let bills = store
        .query(collections::BILLS, &Filter::new())
        .await
        .unwrap();
    assert_eq!(bills.len(), 2);
    let parsed: Vec<Bill> = bills.iter().map(|d| Bill::from_document(d).unwrap()).collect();
    assert!(parsed.iter().any(|b| b.status == BillStatus::Paid
        && b.items[0].description == "Old consultation"));
    assert!(parsed.iter().any(|b| b.status == BillStatus::Pending
        && b.total == Money::inr(dec!(250))));

    // Re-running is a no-op.
    assert_eq!(ledger.migrate_embedded_bills(patient.id).await.unwrap(), 0);
}
