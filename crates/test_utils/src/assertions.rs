//! Fresh-read assertions
//!
//! All assertions re-fetch from the store rather than trusting values a
//! service returned, so they catch writes that never landed.

use std::sync::Arc;

use domain_records::{Bed, BedStatus, Patient, PatientStatus, Record};
use infra_store::{DocumentStore, Filter, MemoryStore};

/// Re-fetches a record by id, panicking if missing or malformed
pub async fn fetch<R: Record>(store: &Arc<MemoryStore>, id: &str) -> R {
    let document = store
        .get(R::COLLECTION, id)
        .await
        .unwrap_or_else(|e| panic!("fetch: store error on {}/{id}: {e}", R::COLLECTION))
        .unwrap_or_else(|| panic!("fetch: no document {}/{id}", R::COLLECTION));
    R::from_document(&document)
        .unwrap_or_else(|e| panic!("fetch: malformed {}/{id}: {e}", R::COLLECTION))
}

/// Asserts a bed's status after a fresh read
pub async fn assert_bed_status(store: &Arc<MemoryStore>, bed_id: &str, expected: BedStatus) {
    let bed: Bed = fetch(store, bed_id).await;
    assert_eq!(bed.status, expected, "bed {bed_id} status");
}

/// Asserts a patient's status after a fresh read
pub async fn assert_patient_status(
    store: &Arc<MemoryStore>,
    patient_id: &str,
    expected: PatientStatus,
) {
    let patient: Patient = fetch(store, patient_id).await;
    assert_eq!(patient.status, expected, "patient {patient_id} status");
}

/// Asserts a patient's discharge flags after a fresh read
pub async fn assert_discharge_flags(
    store: &Arc<MemoryStore>,
    patient_id: &str,
    initiated: bool,
    completed: bool,
) {
    let patient: Patient = fetch(store, patient_id).await;
    assert_eq!(
        patient.discharge_initiated, initiated,
        "patient {patient_id} dischargeInitiated"
    );
    assert_eq!(
        patient.discharge_completed, completed,
        "patient {patient_id} dischargeCompleted"
    );
}

/// Counts documents in a collection matching the filter
pub async fn count(store: &Arc<MemoryStore>, collection: &str, filter: &Filter) -> usize {
    store
        .query(collection, filter)
        .await
        .unwrap_or_else(|e| panic!("count: store error on {collection}: {e}"))
        .len()
}
