use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{LocationId, ProductId};

/// Why a movement or adjustment happened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonCode {
    Sale,
    Transfer,
    Receipt,
    Return,
    Damage,
    Correction,
    Other(String),
}

/// Current on-hand stock of one product at one location.
///
/// Never deleted by the storage layer, only zeroed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub quantity: u64,
    pub last_updated: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Append-only stock movement event.
///
/// Negative quantities are outgoing (demand); positive quantities are inbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub product_id: ProductId,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub quantity: i64,
    pub reason: ReasonCode,
    pub occurred_at: DateTime<Utc>,
}

impl MovementRecord {
    pub fn is_outgoing(&self) -> bool {
        self.quantity < 0
    }
}

/// Append-only non-transfer stock correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub delta: i64,
    pub reason: ReasonCode,
    pub occurred_at: DateTime<Utc>,
}

/// Purchase-order line, used only as a lead-time sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub product_id: ProductId,
    pub ordered_at: DateTime<Utc>,
    pub expected_delivery: Option<DateTime<Utc>>,
}

impl PurchaseOrderLine {
    /// Whole days between order placement and expected delivery.
    ///
    /// `None` when no delivery date is known or the dates are inverted.
    pub fn lead_time_days(&self) -> Option<i64> {
        let delivery = self.expected_delivery?;
        let days = (delivery - self.ordered_at).num_days();
        (days >= 0).then_some(days)
    }
}

/// One line of a physical count submission.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StocktakeCount {
    pub product_id: ProductId,
    pub counted: u64,
}
