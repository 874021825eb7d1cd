//! In-memory record store.
//!
//! Backs the CLI (state serialized to JSON between runs) and every test.
//! All access funnels through one async mutex, so the store itself provides
//! the read-modify-write serialization the pace estimate needs.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use async_trait::async_trait;
use restock_core::{Category, Product, PurchaseEvent, Reminder, ReminderStatus};

use crate::store::{NewProduct, RecordStore, StoreError, StoreResult};

/// The whole store as plain data; serializable so the CLI can keep it in a
/// JSON state file between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub products: Vec<Product>,
    pub purchases: Vec<PurchaseEvent>,
    pub reminders: Vec<Reminder>,
}

impl StoreState {
    /// Demo household: a few products with enough history for the estimator
    /// to have already adapted their pace.
    pub fn sample(household_id: &str, purchaser_id: &str, now: DateTime<Utc>) -> Self {
        use restock_core::{PaceOutcome, PacePolicy, ReminderPolicy, pace, reminder};

        let mut state = StoreState::default();

        let seeds: &[(&str, Category, i64)] = &[
            ("Laundry Detergent", Category::Detergent, 45),
            ("Soy Sauce", Category::Condiment, 120),
            ("Shampoo", Category::Toiletry, 35),
            ("Tissue Box", Category::Household, 14),
        ];

        for (name, category, gap_days) in seeds {
            let mut product = Product::new(
                Uuid::new_v4().to_string(),
                household_id,
                *name,
                category.clone(),
            );

            // Two past purchases one real-usage gap apart, newest last.
            for back in [2 * gap_days, *gap_days] {
                state.purchases.push(PurchaseEvent::new(
                    Uuid::new_v4().to_string(),
                    &product.id,
                    purchaser_id,
                    Some(300.0),
                    1,
                    now - Duration::days(back),
                ));
            }

            // Let the estimator blend the observed gap into the prior, as it
            // would have on the second purchase.
            let mut history: Vec<PurchaseEvent> = state
                .purchases
                .iter()
                .filter(|e| e.product_id == product.id)
                .cloned()
                .collect();
            history.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
            if let PaceOutcome::Updated(days) = pace::update_pace(
                product.current_consumption_days,
                &history,
                &PacePolicy::default(),
            ) {
                product.current_consumption_days = days;
            }

            let last_bought = now.date_naive() - Duration::days(*gap_days);
            state.reminders.push(Reminder {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                purchaser_id: purchaser_id.to_string(),
                target_date: reminder::target_date(
                    last_bought,
                    product.current_consumption_days,
                    &ReminderPolicy::default(),
                ),
                status: ReminderStatus::Pending,
            });
            state.products.push(product);
        }

        state
    }
}

pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_state(StoreState::default())
    }

    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Snapshot for persistence.
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_products_by_household(&self, household_id: &str) -> StoreResult<Vec<Product>> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| p.household_id == household_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_product(&self, product_id: &str) -> StoreResult<Product> {
        let state = self.state.lock().await;
        state
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))
    }

    async fn create_product(&self, fields: NewProduct) -> StoreResult<Product> {
        if fields.default_consumption_days <= 0 {
            return Err(StoreError::Validation(
                "default_consumption_days must be positive".into(),
            ));
        }
        let mut state = self.state.lock().await;
        let product = Product {
            id: Uuid::new_v4().to_string(),
            household_id: fields.household_id,
            name: fields.name,
            category: fields.category,
            default_consumption_days: fields.default_consumption_days,
            current_consumption_days: fields.default_consumption_days,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update_product_consumption_days(
        &self,
        product_id: &str,
        days: i64,
    ) -> StoreResult<()> {
        if days <= 0 {
            return Err(StoreError::Validation(
                "consumption days must be positive".into(),
            ));
        }
        let mut state = self.state.lock().await;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id}")))?;
        product.current_consumption_days = days;
        Ok(())
    }

    async fn record_purchase(
        &self,
        product_id: &str,
        purchaser_id: &str,
        price: Option<f64>,
        quantity: u32,
        purchased_at: DateTime<Utc>,
    ) -> StoreResult<PurchaseEvent> {
        let mut state = self.state.lock().await;
        if !state.products.iter().any(|p| p.id == product_id) {
            return Err(StoreError::NotFound(format!("product {product_id}")));
        }
        let event = PurchaseEvent::new(
            Uuid::new_v4().to_string(),
            product_id,
            purchaser_id,
            price,
            quantity,
            purchased_at,
        );
        state.purchases.push(event.clone());
        Ok(event)
    }

    async fn find_recent_purchases(
        &self,
        product_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<PurchaseEvent>> {
        let state = self.state.lock().await;
        let mut events: Vec<PurchaseEvent> = state
            .purchases
            .iter()
            .filter(|e| e.product_id == product_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        events.truncate(limit);
        Ok(events)
    }

    async fn find_recent_purchases_by_user(
        &self,
        purchaser_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<PurchaseEvent>> {
        let state = self.state.lock().await;
        let mut events: Vec<PurchaseEvent> = state
            .purchases
            .iter()
            .filter(|e| e.purchaser_id == purchaser_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        events.truncate(limit);
        Ok(events)
    }

    async fn find_last_purchase(
        &self,
        product_id: &str,
    ) -> StoreResult<Option<PurchaseEvent>> {
        Ok(self
            .find_recent_purchases(product_id, 1)
            .await?
            .into_iter()
            .next())
    }

    async fn find_pending_reminder(
        &self,
        product_id: &str,
        purchaser_id: &str,
    ) -> StoreResult<Option<Reminder>> {
        let state = self.state.lock().await;
        Ok(state
            .reminders
            .iter()
            .find(|r| {
                r.product_id == product_id
                    && r.purchaser_id == purchaser_id
                    && r.status == ReminderStatus::Pending
            })
            .cloned())
    }

    async fn create_reminder(
        &self,
        product_id: &str,
        purchaser_id: &str,
        target_date: NaiveDate,
    ) -> StoreResult<Reminder> {
        let mut state = self.state.lock().await;
        let duplicate = state.reminders.iter().any(|r| {
            r.product_id == product_id
                && r.purchaser_id == purchaser_id
                && r.status == ReminderStatus::Pending
        });
        if duplicate {
            return Err(StoreError::DuplicateReminder {
                product_id: product_id.to_string(),
            });
        }
        let reminder = Reminder {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            purchaser_id: purchaser_id.to_string(),
            target_date,
            status: ReminderStatus::Pending,
        };
        state.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn retarget_reminder(
        &self,
        reminder_id: &str,
        target_date: NaiveDate,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let reminder = state
            .reminders
            .iter_mut()
            .find(|r| r.id == reminder_id)
            .ok_or_else(|| StoreError::NotFound(format!("reminder {reminder_id}")))?;
        if reminder.status != ReminderStatus::Pending {
            return Err(StoreError::Validation(
                "only pending reminders can be retargeted".into(),
            ));
        }
        reminder.target_date = target_date;
        Ok(())
    }

    async fn complete_reminder(&self, reminder_id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let reminder = state
            .reminders
            .iter_mut()
            .find(|r| r.id == reminder_id)
            .ok_or_else(|| StoreError::NotFound(format!("reminder {reminder_id}")))?;
        // Re-completing is a no-op; dismissal is still a terminal state.
        if reminder.status == ReminderStatus::Pending {
            reminder.status = ReminderStatus::Completed;
        }
        Ok(())
    }

    async fn find_due_reminders(
        &self,
        purchaser_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> StoreResult<Vec<Reminder>> {
        let state = self.state.lock().await;
        let mut due: Vec<Reminder> = state
            .reminders
            .iter()
            .filter(|r| {
                r.purchaser_id == purchaser_id
                    && r.status == ReminderStatus::Pending
                    && r.target_date >= window_start
                    && r.target_date <= window_end
            })
            .cloned()
            .collect();
        due.sort_by(|a, b| a.target_date.cmp(&b.target_date));
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            household_id: "h1".into(),
            name: name.into(),
            category: Category::Household,
            default_consumption_days: 30,
        }
    }

    #[tokio::test]
    async fn test_duplicate_pending_reminder_rejected() {
        let store = MemoryStore::new();
        let p = store.create_product(new_product("tissue")).await.unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        store.create_reminder(&p.id, "u1", d).await.unwrap();
        let err = store.create_reminder(&p.id, "u1", d).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateReminder { .. }));

        // A different purchaser is a different pair.
        store.create_reminder(&p.id, "u2", d).await.unwrap();
    }

    #[tokio::test]
    async fn test_complete_reminder_is_idempotent() {
        let store = MemoryStore::new();
        let p = store.create_product(new_product("tissue")).await.unwrap();
        let r = store
            .create_reminder(&p.id, "u1", NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
            .await
            .unwrap();

        store.complete_reminder(&r.id).await.unwrap();
        store.complete_reminder(&r.id).await.unwrap();

        let err = store.complete_reminder("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recent_purchases_newest_first() {
        let store = MemoryStore::new();
        let p = store.create_product(new_product("soap")).await.unwrap();
        for day in [1, 15, 8] {
            store
                .record_purchase(
                    &p.id,
                    "u1",
                    None,
                    1,
                    Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
                )
                .await
                .unwrap();
        }

        let events = store.find_recent_purchases(&p.id, 2).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].purchased_at > events[1].purchased_at);
    }

    #[tokio::test]
    async fn test_nonpositive_consumption_days_rejected() {
        let store = MemoryStore::new();
        let p = store.create_product(new_product("soap")).await.unwrap();
        let err = store
            .update_product_consumption_days(&p.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_state_round_trips_through_json() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let state = StoreState::sample("h1", "u1", now);
        let json = serde_json::to_string_pretty(&state).unwrap();
        let back: StoreState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
        assert_eq!(back.products.len(), 4);
    }
}
