//! Billing Domain - OPD bills and payments
//!
//! This crate owns the bill record and the per-visit (OPD) billing
//! operations: generating a consultation bill from an appointment,
//! applying discounts, and recording payments.
//!
//! # Total invariant
//!
//! A bill's `total` is never stored independently of its components:
//! every mutation recomputes `total = subtotal + tax - discount`,
//! clamped at zero. Tests assert this after each operation.
//!
//! OPD bill writes are single-document and non-transactional; only the
//! discharge workflow (see `domain_discharge`) commits multi-document
//! transactions.

pub mod bill;
pub mod fees;
pub mod ledger;
pub mod error;

pub use bill::{Bill, BillItem, BillStatus, generate_bill_number};
pub use fees::FeeSchedule;
pub use ledger::BillingLedger;
pub use error::BillingError;
