//! Lab order record

use chrono::{DateTime, Utc};
use core_kernel::temporal::store_timestamp;
use core_kernel::{LabOrderId, Money, PatientId};
use serde::{Deserialize, Serialize};

use crate::collections;
use crate::record::Record;

/// Lab order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabOrderStatus {
    Ordered,
    InProgress,
    Completed,
}

/// A single ordered test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub name: String,
    pub price: Money,
}

/// A laboratory order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabOrder {
    pub id: LabOrderId,
    pub patient_id: PatientId,
    pub tests: Vec<LabTest>,
    pub total_amount: Money,
    pub status: LabOrderStatus,
    /// Set once the order has been pulled into a bill
    #[serde(default)]
    pub bill_generated: bool,
    #[serde(with = "store_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Record for LabOrder {
    const COLLECTION: &'static str = collections::LAB_ORDERS;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl LabOrder {
    /// True when the order should appear on the discharge invoice
    pub fn is_chargeable(&self) -> bool {
        self.status == LabOrderStatus::Completed && !self.bill_generated
    }

    /// One-line summary of the ordered tests for an invoice item
    pub fn tests_summary(&self) -> String {
        self.tests
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chargeable_and_summary() {
        let order = LabOrder {
            id: LabOrderId::new(),
            patient_id: PatientId::new(),
            tests: vec![
                LabTest {
                    name: "CBC".to_string(),
                    price: Money::inr(dec!(250)),
                },
                LabTest {
                    name: "Lipid Profile".to_string(),
                    price: Money::inr(dec!(450)),
                },
            ],
            total_amount: Money::inr(dec!(700)),
            status: LabOrderStatus::Completed,
            bill_generated: false,
            created_at: Utc::now(),
        };

        assert!(order.is_chargeable());
        assert_eq!(order.tests_summary(), "CBC, Lipid Profile");

        let mut billed = order.clone();
        billed.bill_generated = true;
        assert!(!billed.is_chargeable());
    }
}
