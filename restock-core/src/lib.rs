//! restock-core: domain types and pure logic for household restock tracking.
//!
//! Everything here is synchronous and side-effect free; persistence and
//! orchestration live in `restock-engine`.

pub mod matcher;
pub mod pace;
pub mod product;
pub mod purchase;
pub mod reminder;

pub use matcher::{MatchPolicy, find_match, similarity};
pub use pace::{PaceOutcome, PacePolicy, update_pace};
pub use product::{Category, GENERIC_CONSUMPTION_DAYS, Product};
pub use purchase::PurchaseEvent;
pub use reminder::{
    Reminder, ReminderPolicy, ReminderStatus, RestockStatus, UrgencyView, classify, due_window,
    status_for_days_left, target_date,
};
