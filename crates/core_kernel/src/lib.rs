//! Core Kernel - Foundational types for the hospital operations core
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal utilities for normalizing store-native timestamps
//! - Strongly-typed identifiers and the human-readable UHID

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, Rate, MoneyError};
pub use temporal::{TimeSlot, TemporalError, parse_timestamp_value};
pub use identifiers::{
    PatientId, BedId, AppointmentId, BillId, PrescriptionId,
    LabOrderId, InventoryItemId, StaffId, Uhid, UhidError,
};
pub use error::CoreError;
