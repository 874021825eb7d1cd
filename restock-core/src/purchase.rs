//! Purchase events: immutable, append-only facts about what was bought when.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded purchase of a product. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub id: String,
    pub product_id: String,
    pub purchaser_id: String,
    /// Price per the receipt line, if extraction found one.
    pub price: Option<f64>,
    /// At least 1.
    pub quantity: u32,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseEvent {
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        purchaser_id: impl Into<String>,
        price: Option<f64>,
        quantity: u32,
        purchased_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            purchaser_id: purchaser_id.into(),
            price,
            quantity: quantity.max(1),
            purchased_at,
        }
    }
}
