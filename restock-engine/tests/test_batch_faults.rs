//! Batch behavior when the store misbehaves mid-item: row-level errors skip
//! the item and keep going; an outage aborts, leaving committed work in place.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use restock_core::{Product, PurchaseEvent, Reminder};
use restock_engine::{
    Ingestor, MemoryStore, NewProduct, RecordStore, StoreError, StoreResult,
};
use restock_ingest::ExtractedLineItem;
use std::sync::Arc;

fn item(name: &str, price: f64, category: &str) -> ExtractedLineItem {
    ExtractedLineItem {
        name: name.to_string(),
        price: Some(price),
        category_guess: category.to_string(),
        confidence: 0.8,
        quantity: 1,
    }
}

/// In-memory store that fails `record_purchase` for one product name and
/// counts pace-history lookups. Everything else delegates.
struct FaultyStore {
    inner: MemoryStore,
    fail_name: String,
    outage: bool,
    pace_lookups: AtomicUsize,
}

impl FaultyStore {
    fn new(fail_name: &str, outage: bool) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_name: fail_name.to_string(),
            outage,
            pace_lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn find_products_by_household(&self, household_id: &str) -> StoreResult<Vec<Product>> {
        self.inner.find_products_by_household(household_id).await
    }

    async fn find_product(&self, product_id: &str) -> StoreResult<Product> {
        self.inner.find_product(product_id).await
    }

    async fn create_product(&self, fields: NewProduct) -> StoreResult<Product> {
        self.inner.create_product(fields).await
    }

    async fn update_product_consumption_days(
        &self,
        product_id: &str,
        days: i64,
    ) -> StoreResult<()> {
        self.inner
            .update_product_consumption_days(product_id, days)
            .await
    }

    async fn record_purchase(
        &self,
        product_id: &str,
        purchaser_id: &str,
        price: Option<f64>,
        quantity: u32,
        purchased_at: DateTime<Utc>,
    ) -> StoreResult<PurchaseEvent> {
        let product = self.inner.find_product(product_id).await?;
        if product.name == self.fail_name {
            return Err(if self.outage {
                StoreError::Unavailable("connection reset".into())
            } else {
                StoreError::NotFound(format!("product {product_id}"))
            });
        }
        self.inner
            .record_purchase(product_id, purchaser_id, price, quantity, purchased_at)
            .await
    }

    async fn find_recent_purchases(
        &self,
        product_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<PurchaseEvent>> {
        self.pace_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_recent_purchases(product_id, limit).await
    }

    async fn find_recent_purchases_by_user(
        &self,
        purchaser_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<PurchaseEvent>> {
        self.inner
            .find_recent_purchases_by_user(purchaser_id, limit)
            .await
    }

    async fn find_last_purchase(&self, product_id: &str) -> StoreResult<Option<PurchaseEvent>> {
        self.inner.find_last_purchase(product_id).await
    }

    async fn find_pending_reminder(
        &self,
        product_id: &str,
        purchaser_id: &str,
    ) -> StoreResult<Option<Reminder>> {
        self.inner.find_pending_reminder(product_id, purchaser_id).await
    }

    async fn create_reminder(
        &self,
        product_id: &str,
        purchaser_id: &str,
        target_date: NaiveDate,
    ) -> StoreResult<Reminder> {
        self.inner
            .create_reminder(product_id, purchaser_id, target_date)
            .await
    }

    async fn retarget_reminder(
        &self,
        reminder_id: &str,
        target_date: NaiveDate,
    ) -> StoreResult<()> {
        self.inner.retarget_reminder(reminder_id, target_date).await
    }

    async fn complete_reminder(&self, reminder_id: &str) -> StoreResult<()> {
        self.inner.complete_reminder(reminder_id).await
    }

    async fn find_due_reminders(
        &self,
        purchaser_id: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> StoreResult<Vec<Reminder>> {
        self.inner
            .find_due_reminders(purchaser_id, window_start, window_end)
            .await
    }
}

#[tokio::test]
async fn test_row_level_store_error_skips_item_and_continues() {
    let store = Arc::new(FaultyStore::new("Shampoo", false));
    let ingestor = Ingestor::new(store.clone());
    let when = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();

    let report = ingestor
        .ingest(
            &[
                item("Shampoo", 500.0, "toiletry"),
                item("Tissue Box", 128.0, "household"),
            ],
            "u1",
            "h1",
            when,
        )
        .await
        .unwrap();

    assert_eq!(report.items_skipped, 1);
    assert_eq!(report.items_saved, 1);
    assert_eq!(report.items[0].name, "Tissue Box");
    assert_eq!(report.reminders_created, 1);
    // The product row committed before the purchase failed stays committed.
    assert_eq!(report.products_created, 2);
}

#[tokio::test]
async fn test_store_outage_aborts_batch_keeping_committed_items() {
    let store = Arc::new(FaultyStore::new("Shampoo", true));
    let ingestor = Ingestor::new(store.clone());
    let when = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();

    let err = ingestor
        .ingest(
            &[
                item("Tissue Box", 128.0, "household"),
                item("Shampoo", 500.0, "toiletry"),
                item("Soy Sauce", 158.0, "condiment"),
            ],
            "u1",
            "h1",
            when,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    // The tissue purchase before the outage stays; the item after the
    // outage was never reached.
    let products = store.find_products_by_household("h1").await.unwrap();
    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Shampoo", "Tissue Box"]);

    let tissue = products.iter().find(|p| p.name == "Tissue Box").unwrap();
    let purchases = store.find_recent_purchases(&tissue.id, 10).await.unwrap();
    assert_eq!(purchases.len(), 1);
}

#[tokio::test]
async fn test_estimator_skips_products_created_in_this_batch() {
    let store = Arc::new(FaultyStore::new("", false));
    let ingestor = Ingestor::new(store.clone());
    let first = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

    // Duplicate lines collapse onto one brand-new product; neither line may
    // trigger a pace lookup, the product did not exist before the batch.
    ingestor
        .ingest(
            &[
                item("Dish Soap", 300.0, "detergent"),
                item("dish soap", 300.0, "detergent"),
            ],
            "u1",
            "h1",
            first,
        )
        .await
        .unwrap();
    assert_eq!(store.pace_lookups.load(Ordering::SeqCst), 0);

    // A later batch sees the product as pre-existing and learns from it.
    ingestor
        .ingest(
            &[item("Dish Soap", 300.0, "detergent")],
            "u1",
            "h1",
            first + Duration::days(40),
        )
        .await
        .unwrap();
    assert_eq!(store.pace_lookups.load(Ordering::SeqCst), 1);
}
