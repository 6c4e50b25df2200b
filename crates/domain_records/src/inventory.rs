//! Inventory item record

use core_kernel::{InventoryItemId, Money};
use serde::{Deserialize, Serialize};

use crate::collections;
use crate::record::Record;

/// A pharmacy/store inventory item
///
/// The expense aggregator prices dispensed medicines by name lookup in
/// this collection; items without a match degrade to a flagged
/// zero-priced line, never to a silent omission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub unit_price: Money,
    pub stock: u32,
}

impl Record for InventoryItem {
    const COLLECTION: &'static str = collections::INVENTORY;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl InventoryItem {
    /// Case-insensitive name match used by medicine pricing
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}
