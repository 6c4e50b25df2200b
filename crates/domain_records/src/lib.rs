//! Typed hospital records
//!
//! Documents cross from the loosely-typed store into these schema types
//! exactly once, through the [`Record`] trait's validating deserializers
//! (parse, don't validate). Store-native timestamp variants are normalized
//! to `DateTime<Utc>` at that boundary; statuses become enums; malformed
//! documents are rejected with a descriptive error instead of flowing
//! onward as bags of JSON.

pub mod collections;
pub mod record;
pub mod service;
pub mod patient;
pub mod bed;
pub mod appointment;
pub mod prescription;
pub mod lab_order;
pub mod inventory;
pub mod error;

pub use record::Record;
pub use service::ServiceType;
pub use patient::{Patient, PatientStatus, EmbeddedBill};
pub use bed::{Bed, BedStatus};
pub use appointment::{
    Appointment, AppointmentStatus, AppointmentType, BedRequestStatus,
    find_slot_conflict, next_queue_number,
};
pub use prescription::{Prescription, PrescriptionStatus, PrescribedMedicine};
pub use lab_order::{LabOrder, LabOrderStatus, LabTest};
pub use inventory::InventoryItem;
pub use error::RecordError;
