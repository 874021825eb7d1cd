//! Household product overview: stock-level estimate per product.

use chrono::NaiveDate;
use serde::Serialize;

use restock_core::{Category, ReminderPolicy, RestockStatus, status_for_days_left};

use crate::store::{RecordStore, StoreResult};

#[derive(Debug, Clone, Serialize)]
pub struct ProductOverview {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub current_consumption_days: i64,
    pub last_purchase: Option<NaiveDate>,
    pub last_price: Option<f64>,
    /// Estimated days until the product runs out; `None` with no purchase
    /// history.
    pub days_until_empty: Option<i64>,
    pub status: Option<RestockStatus>,
}

/// Every product in the household with its depletion estimate, sorted by
/// name (the store's iteration order).
pub async fn product_overview<S: RecordStore>(
    store: &S,
    household_id: &str,
    today: NaiveDate,
    policy: &ReminderPolicy,
) -> StoreResult<Vec<ProductOverview>> {
    let products = store.find_products_by_household(household_id).await?;

    let mut out = Vec::with_capacity(products.len());
    for product in products {
        let last = store.find_last_purchase(&product.id).await?;

        let (last_purchase, last_price, days_until_empty, status) = match last {
            Some(event) => {
                let bought = event.purchased_at.date_naive();
                let days_since = (today - bought).num_days();
                let left = product.current_consumption_days - days_since;
                (
                    Some(bought),
                    event.price,
                    Some(left),
                    Some(status_for_days_left(left, policy)),
                )
            }
            None => (None, None, None, None),
        };

        out.push(ProductOverview {
            id: product.id,
            name: product.name,
            category: product.category,
            current_consumption_days: product.current_consumption_days,
            last_purchase,
            last_price,
            days_until_empty,
            status,
        });
    }
    Ok(out)
}
