//! Inventory models: items, lots, dispenses.

use serde::{Deserialize, Serialize};

/// A stocked product (drug, kit, supply).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    /// Primary key (UUID)
    pub id: String,
    /// Product name
    pub name: String,
    /// Grouping category
    pub category: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl InventoryItem {
    /// Create a new inventory item with required fields.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            category: None,
            description: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A quantity-tracked batch of an item.
///
/// Quantity only decreases through a successful dispense and only
/// increases through lot creation; it never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryLot {
    /// Primary key (UUID)
    pub id: String,
    /// Owning item
    pub item_id: String,
    /// Manufacturer lot code
    pub lot_code: Option<String>,
    /// Units remaining
    pub quantity: i64,
    /// Expiry date (YYYY-MM-DD)
    pub expires_on: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl InventoryLot {
    /// Create a new lot with required fields.
    pub fn new(item_id: String, quantity: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_id,
            lot_code: None,
            quantity,
            expires_on: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// An immutable ledger entry recording stock leaving a lot to a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dispense {
    /// Primary key (UUID)
    pub id: String,
    /// Receiving patient
    pub patient_id: String,
    /// Item dispensed
    pub item_id: String,
    /// Lot the stock came from
    pub lot_id: String,
    /// Units dispensed, always positive
    pub quantity: i64,
    /// Creation timestamp
    pub created_at: String,
}

impl Dispense {
    /// Create a new dispense record.
    pub fn new(patient_id: String, item_id: String, lot_id: String, quantity: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            item_id,
            lot_id,
            quantity,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A dispense request, as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DispenseRequest {
    /// Receiving patient (required)
    pub patient_id: String,
    /// Item being dispensed (required, must own the lot)
    pub item_id: String,
    /// Lot to draw from (required)
    pub lot_id: String,
    /// Units requested, must be positive
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item() {
        let item = InventoryItem::new("Investigational Kit A".into());
        assert_eq!(item.name, "Investigational Kit A");
        assert_eq!(item.id.len(), 36); // UUID format
    }

    #[test]
    fn test_new_lot() {
        let lot = InventoryLot::new("item-1".into(), 20);
        assert_eq!(lot.item_id, "item-1");
        assert_eq!(lot.quantity, 20);
        assert!(lot.expires_on.is_none());
    }

    #[test]
    fn test_new_dispense() {
        let dispense = Dispense::new("patient-1".into(), "item-1".into(), "lot-1".into(), 3);
        assert_eq!(dispense.quantity, 3);
        assert_eq!(dispense.lot_id, "lot-1");
    }
}
