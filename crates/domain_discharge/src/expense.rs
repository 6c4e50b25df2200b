//! Discharge expense items
//!
//! Ephemeral, computed values: the aggregation is handed to the UI for
//! review and later to the finalizer, but is never persisted itself.

use core_kernel::{Currency, Money, Rate};
use domain_records::ServiceType;
use rust_decimal::Decimal;
use serde::Serialize;

/// Which record source an expense line was derived from
///
/// Carried for display and de-duplication only; it implies no ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseSource {
    Appointment,
    Bill,
    Prescription,
    LabOrder,
    Bed,
    Other,
}

/// One line of a discharge expense aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DischargeExpenseItem {
    pub source: ExpenseSource,
    pub description: String,
    pub service_type: ServiceType,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
    /// Back-reference to the source record, used for de-duplication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<String>,
    /// Display annotation, e.g. "(already paid)"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Set when no price could be resolved; the line is zero-priced and
    /// must be adjusted manually before payment
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pricing_unavailable: bool,
}

impl DischargeExpenseItem {
    /// Creates a priced line, computing its total from quantity and unit price
    pub fn new(
        source: ExpenseSource,
        description: impl Into<String>,
        service_type: ServiceType,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            source,
            description: description.into(),
            service_type,
            quantity,
            unit_price,
            total: unit_price.multiply(Decimal::from(quantity)),
            linked_to: None,
            note: None,
            pricing_unavailable: false,
        }
    }

    /// Creates a line with an explicit total that may differ from
    /// quantity times unit price (flattened bill items, exact legacy prices)
    pub fn with_total(
        source: ExpenseSource,
        description: impl Into<String>,
        service_type: ServiceType,
        quantity: u32,
        unit_price: Money,
        total: Money,
    ) -> Self {
        Self {
            source,
            description: description.into(),
            service_type,
            quantity,
            unit_price,
            total,
            linked_to: None,
            note: None,
            pricing_unavailable: false,
        }
    }

    /// Creates a zero-total informational line that keeps an already-paid
    /// charge visible on the invoice without re-charging it
    pub fn informational(
        source: ExpenseSource,
        description: impl Into<String>,
        service_type: ServiceType,
        unit_price: Money,
        note: impl Into<String>,
    ) -> Self {
        Self {
            source,
            description: description.into(),
            service_type,
            quantity: 1,
            unit_price,
            total: Money::zero(unit_price.currency()),
            linked_to: None,
            note: Some(note.into()),
            pricing_unavailable: false,
        }
    }

    /// Creates a zero-priced placeholder for a charge whose price could
    /// not be resolved
    pub fn unpriced(
        source: ExpenseSource,
        description: impl Into<String>,
        service_type: ServiceType,
        quantity: u32,
    ) -> Self {
        let zero = Money::zero(Currency::default());
        Self {
            source,
            description: description.into(),
            service_type,
            quantity,
            unit_price: zero,
            total: zero,
            linked_to: None,
            note: Some("price not found, adjust manually".to_string()),
            pricing_unavailable: true,
        }
    }

    /// Attaches the source record id
    pub fn linked_to(mut self, record_id: impl Into<String>) -> Self {
        self.linked_to = Some(record_id.into());
        self
    }
}

/// The unified, de-duplicated charge list for one patient
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DischargeExpenseAggregation {
    pub items: Vec<DischargeExpenseItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub tax_rate: Rate,
    pub grand_total: Money,
}

impl DischargeExpenseAggregation {
    /// Computes totals over a finished item list
    pub fn from_items(items: Vec<DischargeExpenseItem>, tax_rate: Rate) -> Self {
        let subtotal: Money = items.iter().map(|i| i.total).sum();
        let tax = tax_rate.apply(&subtotal);
        let grand_total = subtotal + tax;
        Self {
            items,
            subtotal,
            tax,
            tax_rate,
            grand_total,
        }
    }

    /// True when any line needs manual pricing before payment
    pub fn needs_manual_pricing(&self) -> bool {
        self.items.iter().any(|i| i.pricing_unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_totals_over_mixed_items() {
        let items = vec![
            DischargeExpenseItem::new(
                ExpenseSource::Bed,
                "Bed Charge (2 days)",
                ServiceType::BedCharge,
                2,
                Money::inr(dec!(1000)),
            ),
            DischargeExpenseItem::informational(
                ExpenseSource::Bill,
                "Consultation - Dr. Mehta",
                ServiceType::Consultation,
                Money::inr(dec!(500)),
                "(already paid)",
            ),
            DischargeExpenseItem::unpriced(
                ExpenseSource::Prescription,
                "Unknown Syrup x 1",
                ServiceType::Medicine,
                1,
            ),
        ];

        let aggregation = DischargeExpenseAggregation::from_items(items, Rate::zero());
        assert_eq!(aggregation.subtotal, Money::inr(dec!(2000)));
        assert_eq!(aggregation.grand_total, Money::inr(dec!(2000)));
        assert!(aggregation.needs_manual_pricing());
    }
}
