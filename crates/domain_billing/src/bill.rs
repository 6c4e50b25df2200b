//! The bill record
//!
//! Bills live in the `bills` collection and are created either per OPD
//! visit (status `pending`, paid at the desk) or at discharge (created
//! already `paid`, since payment is collected before finalization).

use chrono::{DateTime, Utc};
use core_kernel::temporal::{store_timestamp, store_timestamp_opt};
use core_kernel::{AppointmentId, BillId, Money, PatientId, Rate, StaffId, Uhid};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use domain_records::{collections, Record, ServiceType};

/// Bill status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillStatus {
    Draft,
    Pending,
    Paid,
    PartiallyPaid,
    Cancelled,
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BillStatus::Draft => "draft",
            BillStatus::Pending => "pending",
            BillStatus::Paid => "paid",
            BillStatus::PartiallyPaid => "partially-paid",
            BillStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// A line item on a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    pub description: String,
    pub service_type: ServiceType,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
    /// Back-reference to the source record (appointment, prescription,
    /// lab order). Used only for de-duplication, never for ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<String>,
}

impl BillItem {
    /// Creates an item, computing its total from quantity and unit price
    pub fn new(
        description: impl Into<String>,
        service_type: ServiceType,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            description: description.into(),
            service_type,
            quantity,
            unit_price,
            total: unit_price.multiply(Decimal::from(quantity)),
            linked_to: None,
        }
    }

    /// Attaches the source record id
    pub fn linked_to(mut self, record_id: impl Into<String>) -> Self {
        self.linked_to = Some(record_id.into());
        self
    }
}

/// A patient bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: BillId,
    /// Human-readable number, date plus random suffix
    pub bill_number: String,
    pub patient_id: PatientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uhid: Option<Uhid>,
    /// Set when the bill was generated from an OPD appointment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
    pub items: Vec<BillItem>,
    pub subtotal: Money,
    pub discount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_reason: Option<String>,
    pub tax: Money,
    pub tax_rate: Rate,
    pub total: Money,
    pub status: BillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Free-form, store-safe (nulls stripped) payment payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<StaffId>,
    #[serde(default, with = "store_timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<StaffId>,
    #[serde(with = "store_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "store_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Record for Bill {
    const COLLECTION: &'static str = collections::BILLS;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Bill {
    /// Creates an empty draft bill for a patient
    pub fn new(patient_id: PatientId, tax_rate: Rate) -> Self {
        let now = Utc::now();
        let zero = Money::zero(Default::default());

        Self {
            id: BillId::new(),
            bill_number: generate_bill_number(now),
            patient_id,
            patient_name: None,
            uhid: None,
            appointment_id: None,
            items: Vec::new(),
            subtotal: zero,
            discount: zero,
            discount_reason: None,
            tax: zero,
            tax_rate,
            total: zero,
            status: BillStatus::Draft,
            payment_method: None,
            payment_details: None,
            created_by: None,
            paid_at: None,
            paid_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds an item and recomputes totals
    pub fn add_item(&mut self, item: BillItem) {
        self.items.push(item);
        self.recalculate_totals();
    }

    /// Applies a discount and recomputes totals
    pub fn apply_discount(&mut self, amount: Money, reason: impl Into<String>) {
        self.discount = amount;
        self.discount_reason = Some(reason.into());
        self.recalculate_totals();
    }

    /// Marks the bill paid, stamping the payment audit fields
    ///
    /// `details` must already be store-safe; callers clean free-form
    /// payloads with `infra_store::strip_nulls_deep` first.
    pub fn mark_paid(&mut self, method: impl Into<String>, details: Option<Value>, paid_by: StaffId) {
        let now = Utc::now();
        self.status = BillStatus::Paid;
        self.payment_method = Some(method.into());
        self.payment_details = details;
        self.paid_at = Some(now);
        self.paid_by = Some(paid_by);
        self.updated_at = now;
    }

    /// Recomputes `subtotal`, `tax`, and `total` from the components
    ///
    /// `total = subtotal + tax - discount`, clamped at zero.
    pub fn recalculate_totals(&mut self) {
        self.subtotal = self.items.iter().map(|i| i.total).sum();
        self.tax = self.tax_rate.apply(&self.subtotal);
        self.total = (self.subtotal + self.tax - self.discount).clamp_non_negative();
        self.updated_at = Utc::now();
    }

    /// Checks the total invariant (used by tests and assertions)
    pub fn totals_consistent(&self) -> bool {
        let expected_subtotal: Money = self.items.iter().map(|i| i.total).sum();
        self.subtotal == expected_subtotal
            && self.tax == self.tax_rate.apply(&self.subtotal)
            && self.total == (self.subtotal + self.tax - self.discount).clamp_non_negative()
    }
}

/// Generates a human-readable bill number: date plus a random suffix
pub fn generate_bill_number(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().as_u128() % 10_000;
    format!("BILL-{}-{:04}", at.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn consultation_bill() -> Bill {
        let mut bill = Bill::new(PatientId::new(), Rate::zero());
        bill.add_item(BillItem::new(
            "Consultation - General",
            ServiceType::Consultation,
            1,
            Money::inr(dec!(500)),
        ));
        bill
    }

    #[test]
    fn test_item_total_from_quantity() {
        let item = BillItem::new("Paracetamol", ServiceType::Medicine, 10, Money::inr(dec!(15)));
        assert_eq!(item.total, Money::inr(dec!(150)));
    }

    #[test]
    fn test_totals_after_add_and_discount() {
        let mut bill = consultation_bill();
        assert_eq!(bill.total, Money::inr(dec!(500)));
        assert!(bill.totals_consistent());

        bill.add_item(BillItem::new(
            "CBC",
            ServiceType::LabTest,
            1,
            Money::inr(dec!(250)),
        ));
        assert_eq!(bill.total, Money::inr(dec!(750)));

        bill.apply_discount(Money::inr(dec!(100)), "Senior citizen");
        assert_eq!(bill.total, Money::inr(dec!(650)));
        assert!(bill.totals_consistent());
    }

    #[test]
    fn test_discount_clamps_total_at_zero() {
        let mut bill = consultation_bill();
        bill.apply_discount(Money::inr(dec!(900)), "Charity case");
        assert_eq!(bill.total, Money::zero(Default::default()));
        assert!(bill.totals_consistent());
    }

    #[test]
    fn test_mark_paid_stamps_audit_fields() {
        let mut bill = consultation_bill();
        let cashier = StaffId::new();
        bill.mark_paid("cash", None, cashier);

        assert_eq!(bill.status, BillStatus::Paid);
        assert_eq!(bill.payment_method.as_deref(), Some("cash"));
        assert_eq!(bill.paid_by, Some(cashier));
        assert!(bill.paid_at.is_some());
    }

    #[test]
    fn test_bill_number_shape() {
        let at = DateTime::parse_from_rfc3339("2024-03-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let number = generate_bill_number(at);
        assert!(number.starts_with("BILL-20240315-"));
        assert_eq!(number.len(), "BILL-20240315-0000".len());
    }

    #[test]
    fn test_document_roundtrip() {
        let bill = consultation_bill();
        let doc = bill.to_document().unwrap();
        let back = Bill::from_document(&doc).unwrap();
        assert_eq!(back, bill);
    }
}
