//! Record-store boundary.
//!
//! The engine never talks to a concrete database; it is handed something
//! implementing `RecordStore`. `MemoryStore` in this crate is the in-process
//! implementation used by the CLI and tests; a SQL-backed one would slot in
//! behind the same trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use restock_core::{Category, Product, PurchaseEvent, Reminder};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    /// A pending reminder already exists for this (product, purchaser).
    /// Expected under concurrent upserts; callers treat it as "already
    /// scheduled", not as a failure.
    #[error("pending reminder already exists for product {product_id}")]
    DuplicateReminder { product_id: String },
    #[error("validation: {0}")]
    Validation(String),
    /// The store itself is unreachable. The only error that aborts a batch.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for product creation; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub household_id: String,
    pub name: String,
    pub category: Category,
    pub default_consumption_days: i64,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_products_by_household(&self, household_id: &str) -> StoreResult<Vec<Product>>;

    async fn find_product(&self, product_id: &str) -> StoreResult<Product>;

    async fn create_product(&self, fields: NewProduct) -> StoreResult<Product>;

    /// Rewrite a product's adaptive consumption estimate. The pace estimator
    /// is the only caller.
    async fn update_product_consumption_days(
        &self,
        product_id: &str,
        days: i64,
    ) -> StoreResult<()>;

    async fn record_purchase(
        &self,
        product_id: &str,
        purchaser_id: &str,
        price: Option<f64>,
        quantity: u32,
        purchased_at: DateTime<Utc>,
    ) -> StoreResult<PurchaseEvent>;

    /// Newest-first purchase history for one product.
    async fn find_recent_purchases(
        &self,
        product_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<PurchaseEvent>>;

    /// Newest-first purchases across all of one purchaser's products.
    async fn find_recent_purchases_by_user(
        &self,
        purchaser_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<PurchaseEvent>>;

    async fn find_last_purchase(&self, product_id: &str)
    -> StoreResult<Option<PurchaseEvent>>;

    async fn find_pending_reminder(
        &self,
        product_id: &str,
        purchaser_id: &str,
    ) -> StoreResult<Option<Reminder>>;

    /// Fails with `DuplicateReminder` when a pending reminder already exists
    /// for the pair.
    async fn create_reminder(
        &self,
        product_id: &str,
        purchaser_id: &str,
        target_date: NaiveDate,
    ) -> StoreResult<Reminder>;

    /// Move a pending reminder's target date.
    async fn retarget_reminder(&self, reminder_id: &str, target_date: NaiveDate)
    -> StoreResult<()>;

    /// Pending -> Completed. Idempotent: completing an already-completed
    /// reminder is a no-op, not an error.
    async fn complete_reminder(&self, reminder_id: &str) -> StoreResult<()>;

    /// Pending reminders with target date in `[window_start, window_end]`
    /// inclusive, ordered by target date ascending.
    async fn find_due_reminders(
        &self,
        purchaser_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> StoreResult<Vec<Reminder>>;
}
