//! Purchase ingestion: the transaction that turns extracted line items into
//! products, purchase history, pace updates and reminders.
//!
//! Items in one batch are processed strictly in order — later lines must see
//! products created by earlier lines, so duplicate receipt lines for a
//! brand-new product collapse onto one record. Batches for the same
//! household are serialized behind a per-household lock so two concurrent
//! ingestions cannot both create "the same" new product.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use restock_core::{
    Category, MatchPolicy, PaceOutcome, PacePolicy, Product, ReminderPolicy, matcher, pace,
    reminder,
};
use restock_ingest::ExtractedLineItem;

use crate::store::{NewProduct, RecordStore, StoreError, StoreResult};

/// Per-item outcome for the caller's display.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub product_id: String,
    pub name: String,
    pub category: Category,
    pub newly_created: bool,
    pub reminder_date: NaiveDate,
}

/// What one ingestion batch did. Always returned in full, even when
/// individual items were skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestionReport {
    pub items_saved: usize,
    pub items_skipped: usize,
    pub products_created: usize,
    pub products_updated: usize,
    pub reminders_created: usize,
    pub items: Vec<ItemOutcome>,
}

/// Ingestion orchestrator over an injected record store.
pub struct Ingestor<S: RecordStore> {
    store: Arc<S>,
    match_policy: MatchPolicy,
    pace_policy: PacePolicy,
    reminder_policy: ReminderPolicy,
    household_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: RecordStore> Ingestor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            match_policy: MatchPolicy::default(),
            pace_policy: PacePolicy::default(),
            reminder_policy: ReminderPolicy::default(),
            household_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policies(
        store: Arc<S>,
        match_policy: MatchPolicy,
        pace_policy: PacePolicy,
        reminder_policy: ReminderPolicy,
    ) -> Self {
        Self {
            store,
            match_policy,
            pace_policy,
            reminder_policy,
            household_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Ingest one batch of extracted line items for a purchaser/household.
    ///
    /// Item-level trouble (malformed lines, missing rows) skips the item and
    /// keeps going; only a store outage aborts the batch, and items already
    /// committed stay committed.
    pub async fn ingest(
        &self,
        items: &[ExtractedLineItem],
        purchaser_id: &str,
        household_id: &str,
        purchase_date: DateTime<Utc>,
    ) -> StoreResult<IngestionReport> {
        let lock = self.household_lock(household_id).await;
        let _guard = lock.lock().await;

        let mut known = self.store.find_products_by_household(household_id).await?;
        let mut created_in_batch: HashSet<String> = HashSet::new();
        let mut report = IngestionReport::default();

        for item in items {
            let outcome = self
                .ingest_item(
                    item,
                    purchaser_id,
                    household_id,
                    purchase_date,
                    &mut known,
                    &mut created_in_batch,
                    &mut report,
                )
                .await;
            match outcome {
                Ok(()) => {}
                Err(err @ StoreError::Unavailable(_)) => return Err(err),
                Err(err) => {
                    tracing::warn!(item = %item.name, error = %err, "line item failed, continuing batch");
                    report.items_skipped += 1;
                }
            }
        }

        Ok(report)
    }

    async fn ingest_item(
        &self,
        item: &ExtractedLineItem,
        purchaser_id: &str,
        household_id: &str,
        purchase_date: DateTime<Utc>,
        known: &mut Vec<Product>,
        created_in_batch: &mut HashSet<String>,
        report: &mut IngestionReport,
    ) -> StoreResult<()> {
        let name = item.name.trim();
        if name.chars().count() < 2
            || item.quantity == 0
            || item.price.is_some_and(|p| p < 0.0)
        {
            report.items_skipped += 1;
            return Ok(());
        }

        // `known` includes products created earlier in this batch.
        let matched = matcher::find_match(name, known, &self.match_policy).cloned();
        let (mut product, newly_created) = match matched {
            Some(product) => (product, false),
            None => {
                let category = Category::from_name(&item.category_guess);
                let created = self
                    .store
                    .create_product(NewProduct {
                        household_id: household_id.to_string(),
                        name: name.to_string(),
                        category: category.clone(),
                        default_consumption_days: category.default_consumption_days(),
                    })
                    .await?;
                known.push(created.clone());
                created_in_batch.insert(created.id.clone());
                report.products_created += 1;
                (created, true)
            }
        };

        self.store
            .record_purchase(
                &product.id,
                purchaser_id,
                item.price,
                item.quantity,
                purchase_date,
            )
            .await?;

        // The estimator only runs for products the household already had
        // before this batch: a duplicate line matching a product created a
        // few lines earlier has no real gap to learn from.
        if !created_in_batch.contains(&product.id) {
            match self.refresh_pace(&mut product).await {
                Ok(true) => {
                    report.products_updated += 1;
                    if let Some(k) = known.iter_mut().find(|k| k.id == product.id) {
                        k.current_consumption_days = product.current_consumption_days;
                    }
                }
                Ok(false) => {}
                // The purchase is already committed; a failed pace refresh
                // must not undo it or stop the batch.
                Err(err) => {
                    tracing::warn!(
                        product_id = %product.id,
                        error = %err,
                        "pace refresh failed, keeping previous estimate"
                    );
                }
            }
        }

        let target = reminder::target_date(
            purchase_date.date_naive(),
            product.current_consumption_days,
            &self.reminder_policy,
        );
        if self.upsert_reminder(&product.id, purchaser_id, target).await? {
            report.reminders_created += 1;
        }

        report.items.push(ItemOutcome {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            newly_created,
            reminder_date: target,
        });
        report.items_saved += 1;
        Ok(())
    }

    /// Re-learn the product's consumption pace from recent history.
    /// Returns whether the estimate actually changed.
    async fn refresh_pace(&self, product: &mut Product) -> StoreResult<bool> {
        let history = self
            .store
            .find_recent_purchases(&product.id, self.pace_policy.window)
            .await?;
        match pace::update_pace(product.current_consumption_days, &history, &self.pace_policy) {
            PaceOutcome::Updated(days) => {
                self.store
                    .update_product_consumption_days(&product.id, days)
                    .await?;
                product.current_consumption_days = days;
                Ok(true)
            }
            PaceOutcome::InsufficientHistory | PaceOutcome::NoisyInterval => Ok(false),
        }
    }

    /// Ensure a pending reminder exists for the pair and points at `target`.
    /// Returns whether a reminder was newly created.
    async fn upsert_reminder(
        &self,
        product_id: &str,
        purchaser_id: &str,
        target: NaiveDate,
    ) -> StoreResult<bool> {
        if let Some(existing) = self
            .store
            .find_pending_reminder(product_id, purchaser_id)
            .await?
        {
            if existing.target_date != target {
                self.store.retarget_reminder(&existing.id, target).await?;
            }
            return Ok(false);
        }

        match self
            .store
            .create_reminder(product_id, purchaser_id, target)
            .await
        {
            Ok(_) => Ok(true),
            // Lost a race with a concurrent upsert: already scheduled.
            Err(StoreError::DuplicateReminder { .. }) => {
                tracing::debug!(product_id, "reminder already scheduled");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn household_lock(&self, household_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.household_locks.lock().await;
        locks
            .entry(household_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
