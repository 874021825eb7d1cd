//! Reminder scheduling: target-date derivation and urgency classification.
//!
//! All date math here is date-only (time of day truncated upstream).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "dismissed")]
    Dismissed,
}

/// A scheduled repurchase nudge for one (product, purchaser) pair.
/// At most one pending reminder exists per pair; the store enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub product_id: String,
    pub purchaser_id: String,
    pub target_date: NaiveDate,
    pub status: ReminderStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReminderPolicy {
    /// Warn this many days before expected depletion.
    pub lead_days: i64,
    /// `Warning` band: due within this many days.
    pub warning_days: i64,
    /// Due-set queries span `[today - this, today + this]`.
    pub due_window_days: i64,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            lead_days: 3,
            warning_days: 3,
            due_window_days: 3,
        }
    }
}

/// Display bucket for a reminder or a product's stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestockStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "warning")]
    Warning,
    #[serde(rename = "urgent")]
    Urgent,
}

impl std::fmt::Display for RestockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RestockStatus::Ok => "ok",
            RestockStatus::Warning => "warning",
            RestockStatus::Urgent => "urgent",
        })
    }
}

/// Classification of one reminder against "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyView {
    pub status: RestockStatus,
    /// Magnitude in whole days: days overdue when `Urgent` and past due,
    /// days left otherwise.
    pub days: i64,
}

/// When to remind about a product bought on `purchase_date`.
pub fn target_date(
    purchase_date: NaiveDate,
    consumption_days: i64,
    policy: &ReminderPolicy,
) -> NaiveDate {
    purchase_date + Duration::days(consumption_days - policy.lead_days)
}

/// Bucket a days-left figure. Zero or negative means the date has arrived.
pub fn status_for_days_left(days_left: i64, policy: &ReminderPolicy) -> RestockStatus {
    if days_left <= 0 {
        RestockStatus::Urgent
    } else if days_left <= policy.warning_days {
        RestockStatus::Warning
    } else {
        RestockStatus::Ok
    }
}

/// Classify a reminder's target date against today (date-only).
pub fn classify(target: NaiveDate, today: NaiveDate, policy: &ReminderPolicy) -> UrgencyView {
    let days_left = (target - today).num_days();
    UrgencyView {
        status: status_for_days_left(days_left, policy),
        days: days_left.abs(),
    }
}

/// Inclusive date window the due-set query spans. Deliberately bounded so
/// overdue items surface for a few days instead of piling into a backlog.
pub fn due_window(today: NaiveDate, policy: &ReminderPolicy) -> (NaiveDate, NaiveDate) {
    (
        today - Duration::days(policy.due_window_days),
        today + Duration::days(policy.due_window_days),
    )
}
