//! Due-reminder read path: "what should I buy soon?"

use chrono::NaiveDate;
use serde::Serialize;

use restock_core::{ReminderPolicy, RestockStatus, reminder};

use crate::store::{RecordStore, StoreResult};

/// One due reminder, joined with its product and classified against today.
#[derive(Debug, Clone, Serialize)]
pub struct DueReminder {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub target_date: NaiveDate,
    pub status: RestockStatus,
    /// Days overdue when past due, days left otherwise.
    pub days: i64,
}

/// Pending reminders within the policy's due window around `today`,
/// ascending by target date. Overdue items surface for a few days instead
/// of accumulating into an unbounded backlog.
pub async fn due_reminders<S: RecordStore>(
    store: &S,
    purchaser_id: &str,
    today: NaiveDate,
    policy: &ReminderPolicy,
) -> StoreResult<Vec<DueReminder>> {
    let (window_start, window_end) = reminder::due_window(today, policy);
    let pending = store
        .find_due_reminders(purchaser_id, window_start, window_end)
        .await?;

    let mut out = Vec::with_capacity(pending.len());
    for r in pending {
        let product = store.find_product(&r.product_id).await?;
        let view = reminder::classify(r.target_date, today, policy);
        out.push(DueReminder {
            id: r.id,
            product_id: r.product_id,
            product_name: product.name,
            target_date: r.target_date,
            status: view.status,
            days: view.days,
        });
    }
    Ok(out)
}
