//! Appointment record
//!
//! OPD scheduling itself lives in the UI layer; this module carries the
//! schema plus the two invariants the core enforces at the boundary: no
//! two non-cancelled appointments share a (doctor, date, slot), and queue
//! numbers increase monotonically per doctor per day.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::temporal::store_timestamp;
use core_kernel::{AppointmentId, BillId, PatientId, StaffId, TimeSlot};
use serde::{Deserialize, Serialize};

use crate::collections;
use crate::record::Record;

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

/// Appointment type, which determines the consultation fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    Consultation,
    FollowUp,
    Emergency,
}

/// Status of an inpatient bed request attached to an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedRequestStatus {
    Pending,
    Approved,
}

/// An OPD appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub doctor_id: StaffId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    pub appointment_date: NaiveDate,
    pub time_slot: TimeSlot,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    /// Per-day, per-doctor monotonically increasing position
    pub queue_number: u32,
    /// Set once an OPD bill has been generated for this visit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<BillId>,
    #[serde(default)]
    pub bed_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bed_request_status: Option<BedRequestStatus>,
    #[serde(with = "store_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Record for Appointment {
    const COLLECTION: &'static str = collections::APPOINTMENTS;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Appointment {
    /// True when the visit happened and may owe a consultation fee
    pub fn is_completed(&self) -> bool {
        self.status == AppointmentStatus::Completed
    }

    /// True while an inpatient bed request awaits approval
    pub fn has_pending_bed_request(&self) -> bool {
        self.bed_requested && self.bed_request_status == Some(BedRequestStatus::Pending)
    }
}

/// Finds an existing non-cancelled appointment that would collide with a
/// proposed (doctor, date, slot) booking
pub fn find_slot_conflict<'a>(
    existing: &'a [Appointment],
    doctor_id: StaffId,
    date: NaiveDate,
    slot: TimeSlot,
) -> Option<&'a Appointment> {
    existing.iter().find(|a| {
        a.doctor_id == doctor_id
            && a.appointment_date == date
            && a.status != AppointmentStatus::Cancelled
            && a.time_slot.overlaps(&slot)
    })
}

/// Computes the next queue number for a doctor's day
pub fn next_queue_number(existing: &[Appointment], doctor_id: StaffId, date: NaiveDate) -> u32 {
    existing
        .iter()
        .filter(|a| a.doctor_id == doctor_id && a.appointment_date == date)
        .map(|a| a.queue_number)
        .max()
        .map(|n| n + 1)
        .unwrap_or(1)
}
