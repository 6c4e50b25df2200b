//! Discharge Domain Crate
//!
//! The inpatient discharge workflow: a doctor initiates discharge, the
//! expense aggregator unifies every chargeable event for the patient into
//! one invoice draft, and the receptionist finalizes by committing the
//! paid bill, the patient status change, and the bed release as a single
//! transaction.
//!
//! Aggregation is read-only and idempotent; finalization is the one
//! all-or-nothing operation in the system.

pub mod aggregator;
pub mod error;
pub mod expense;
pub mod workflow;

pub use aggregator::ExpenseAggregator;
pub use error::DischargeError;
pub use expense::{DischargeExpenseAggregation, DischargeExpenseItem, ExpenseSource};
pub use workflow::{DischargeOutcome, DischargeService};
