//! Bed assignment scenarios against the in-memory store

use std::sync::Arc;

use rust_decimal_macros::dec;

use domain_admission::{AdmissionError, AdmissionService};
use domain_billing::FeeSchedule;
use domain_records::{Appointment, Bed, BedRequestStatus, BedStatus, Patient, PatientStatus};
use test_utils::{
    assert_bed_status, assert_discharge_flags, assert_patient_status, fetch, memory_store, seed,
    AppointmentBuilder, BedBuilder, MoneyFixtures, PatientBuilder, TemporalFixtures,
};

fn service(store: &Arc<infra_store::MemoryStore>) -> AdmissionService {
    AdmissionService::new(store.clone(), FeeSchedule::default())
}

#[tokio::test]
async fn test_assign_bed_links_all_three_records() {
    test_utils::init_tracing();
    let store = memory_store();
    let patient = PatientBuilder::new().name("Asha Rao").build();
    let bed = BedBuilder::new().number("203-B").build();
    let appointment = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Pending)
        .build();
    seed(&store, &patient).await;
    seed(&store, &bed).await;
    seed(&store, &appointment).await;

    service(&store)
        .assign_bed(
            bed.id,
            patient.id,
            appointment.id,
            Some(MoneyFixtures::rupees(1000)),
        )
        .await
        .unwrap();

    let bed_after: Bed = fetch(&store, &bed.id.to_string()).await;
    assert_eq!(bed_after.status, BedStatus::Occupied);
    assert_eq!(bed_after.patient_id, Some(patient.id));
    assert_eq!(bed_after.patient_name.as_deref(), Some("Asha Rao"));

    let patient_after: Patient = fetch(&store, &patient.id.to_string()).await;
    assert_eq!(patient_after.status, PatientStatus::Admitted);
    assert_eq!(patient_after.assigned_bed.as_deref(), Some("203-B"));
    assert_eq!(
        patient_after.bed_rate_per_day.unwrap().amount(),
        dec!(1000)
    );
    assert!(patient_after.bed_assigned_at.is_some());

    let appointment_after: Appointment = fetch(&store, &appointment.id.to_string()).await;
    assert_eq!(
        appointment_after.bed_request_status,
        Some(BedRequestStatus::Approved)
    );
}

#[tokio::test]
async fn test_assign_bed_defaults_rate_from_fee_schedule() {
    let store = memory_store();
    let patient = PatientBuilder::new().build();
    let bed = BedBuilder::new().build();
    let appointment = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Pending)
        .build();
    seed(&store, &patient).await;
    seed(&store, &bed).await;
    seed(&store, &appointment).await;

    service(&store)
        .assign_bed(bed.id, patient.id, appointment.id, None)
        .await
        .unwrap();

    let patient_after: Patient = fetch(&store, &patient.id.to_string()).await;
    assert_eq!(
        patient_after.bed_rate_per_day.unwrap(),
        FeeSchedule::default().default_bed_rate_per_day
    );
}

#[tokio::test]
async fn test_occupied_bed_aborts_with_no_partial_writes() {
    let store = memory_store();
    let patient = PatientBuilder::new().build();
    let other = PatientBuilder::new().name("Ravi Iyer").build();
    let bed = BedBuilder::new().occupied_by(&other).build();
    let appointment = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Pending)
        .build();
    seed(&store, &patient).await;
    seed(&store, &other).await;
    seed(&store, &bed).await;
    seed(&store, &appointment).await;

    let err = service(&store)
        .assign_bed(bed.id, patient.id, appointment.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AdmissionError::BedUnavailable { .. }));

    // Nothing moved: the patient and the bed request are untouched.
    assert_patient_status(&store, &patient.id.to_string(), PatientStatus::Stable).await;
    let appointment_after: Appointment = fetch(&store, &appointment.id.to_string()).await;
    assert_eq!(
        appointment_after.bed_request_status,
        Some(BedRequestStatus::Pending)
    );
}

#[tokio::test]
async fn test_stale_patient_reference_blocks_assignment() {
    let store = memory_store();
    let patient = PatientBuilder::new().build();
    let ghost = PatientBuilder::new().build();
    // Status says available but a patient reference lingers.
    let bed = BedBuilder::new()
        .occupied_by(&ghost)
        .status(BedStatus::Available)
        .build();
    let appointment = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Pending)
        .build();
    seed(&store, &patient).await;
    seed(&store, &bed).await;
    seed(&store, &appointment).await;

    let err = service(&store)
        .assign_bed(bed.id, patient.id, appointment.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AdmissionError::BedUnavailable { .. }));
}

#[tokio::test]
async fn test_missing_patient_leaves_bed_available() {
    let store = memory_store();
    let patient = PatientBuilder::new().build();
    let bed = BedBuilder::new().build();
    let appointment = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Pending)
        .build();
    // Patient never seeded.
    seed(&store, &bed).await;
    seed(&store, &appointment).await;

    let err = service(&store)
        .assign_bed(bed.id, patient.id, appointment.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AdmissionError::PatientNotFound(_)));
    assert_bed_status(&store, &bed.id.to_string(), BedStatus::Available).await;
}

#[tokio::test]
async fn test_appointment_without_pending_request_is_rejected() {
    let store = memory_store();
    let patient = PatientBuilder::new().build();
    let bed = BedBuilder::new().build();
    let already_approved = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Approved)
        .build();
    let never_requested = AppointmentBuilder::for_patient(&patient).build();
    seed(&store, &patient).await;
    seed(&store, &bed).await;
    seed(&store, &already_approved).await;
    seed(&store, &never_requested).await;

    let svc = service(&store);
    for id in [already_approved.id, never_requested.id] {
        let err = svc
            .assign_bed(bed.id, patient.id, id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::NoPendingBedRequest(_)));
    }
    assert_bed_status(&store, &bed.id.to_string(), BedStatus::Available).await;
}

#[tokio::test]
async fn test_readmission_resets_prior_discharge() {
    let store = memory_store();
    let doctor = core_kernel::StaffId::new();
    let mut previously_discharged = PatientBuilder::new()
        .status(PatientStatus::Discharged)
        .discharge_initiated(doctor, TemporalFixtures::day0())
        .build();
    previously_discharged.discharge_completed = true;
    previously_discharged.discharge_completed_at = Some(TemporalFixtures::day(2));
    let bed = BedBuilder::new().build();
    let appointment = AppointmentBuilder::for_patient(&previously_discharged)
        .bed_request(BedRequestStatus::Pending)
        .build();
    seed(&store, &previously_discharged).await;
    seed(&store, &bed).await;
    seed(&store, &appointment).await;

    service(&store)
        .assign_bed(bed.id, previously_discharged.id, appointment.id, None)
        .await
        .unwrap();

    let id = previously_discharged.id.to_string();
    assert_patient_status(&store, &id, PatientStatus::Admitted).await;
    assert_discharge_flags(&store, &id, false, false).await;
    let patient_after: Patient = fetch(&store, &id).await;
    assert!(patient_after.discharge_initiated_by.is_none());
    assert!(patient_after.discharge_initiated_at.is_none());
    assert!(patient_after.discharge_completed_at.is_none());
}

#[tokio::test]
async fn test_pending_bed_requests_exclude_cancelled_and_approved() {
    let store = memory_store();
    let patient = PatientBuilder::new().build();
    let pending = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Pending)
        .build();
    let approved = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Approved)
        .build();
    let cancelled = AppointmentBuilder::for_patient(&patient)
        .bed_request(BedRequestStatus::Pending)
        .status(domain_records::AppointmentStatus::Cancelled)
        .build();
    let plain = AppointmentBuilder::for_patient(&patient).build();
    seed(&store, &patient).await;
    for appointment in [&pending, &approved, &cancelled, &plain] {
        seed(&store, appointment).await;
    }

    let requests = service(&store).get_pending_bed_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id, pending.id);
}
