//! Collection names used by the hospital store

pub const PATIENTS: &str = "patients";
pub const BEDS: &str = "beds";
pub const APPOINTMENTS: &str = "appointments";
pub const BILLS: &str = "bills";
pub const PRESCRIPTIONS: &str = "prescriptions";
pub const LAB_ORDERS: &str = "labOrders";
pub const INVENTORY: &str = "inventory";
