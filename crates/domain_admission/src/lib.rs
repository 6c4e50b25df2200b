//! Admission Domain - bed assignment
//!
//! Linking a bed, a patient, and an appointment's bed request is the most
//! contended operation in the system: exactly one of two concurrent
//! assignments may win a bed. It is therefore one of the two operations
//! (with discharge finalization) that run inside a store transaction with
//! preconditions re-checked inside the boundary.

pub mod assignment;
pub mod charges;
pub mod error;

pub use assignment::AdmissionService;
pub use charges::{bed_days, bed_charge, calculate_bed_charges, BedCharge};
pub use error::AdmissionError;
