//! Purchase log read path: recent purchases grouped by shopping day.

use chrono::NaiveDate;
use serde::Serialize;

use restock_core::Category;

use crate::store::{RecordStore, StoreResult};

/// Cap on day groups returned, newest first.
pub const MAX_DAY_GROUPS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseLine {
    pub name: String,
    pub category: Category,
    pub price: Option<f64>,
    pub quantity: u32,
}

/// All purchases from one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDay {
    pub date: NaiveDate,
    pub items: Vec<PurchaseLine>,
    /// Sum of price x quantity over priced lines.
    pub total_price: f64,
    pub total_items: u32,
}

/// A purchaser's recent purchases grouped by day, newest day first.
/// `limit` bounds the raw purchase rows considered, not the day groups.
pub async fn purchase_log<S: RecordStore>(
    store: &S,
    purchaser_id: &str,
    limit: usize,
) -> StoreResult<Vec<PurchaseDay>> {
    let purchases = store
        .find_recent_purchases_by_user(purchaser_id, limit)
        .await?;

    let mut days: Vec<PurchaseDay> = Vec::new();
    for event in purchases {
        let product = store.find_product(&event.product_id).await?;
        let date = event.purchased_at.date_naive();

        let day = match days.iter_mut().find(|d| d.date == date) {
            Some(day) => day,
            None => {
                days.push(PurchaseDay {
                    date,
                    items: Vec::new(),
                    total_price: 0.0,
                    total_items: 0,
                });
                days.last_mut().unwrap()
            }
        };

        day.total_price += event.price.unwrap_or(0.0) * event.quantity as f64;
        day.total_items += event.quantity;
        day.items.push(PurchaseLine {
            name: product.name,
            category: product.category,
            price: event.price,
            quantity: event.quantity,
        });
    }

    days.truncate(MAX_DAY_GROUPS);
    Ok(days)
}
