//! restock-engine: async orchestration over an injected record store.

pub mod history;
pub mod ingest;
pub mod memory;
pub mod overview;
pub mod reminders;
pub mod store;

pub use history::{MAX_DAY_GROUPS, PurchaseDay, PurchaseLine, purchase_log};
pub use ingest::{IngestionReport, Ingestor, ItemOutcome};
pub use memory::{MemoryStore, StoreState};
pub use overview::{ProductOverview, product_overview};
pub use reminders::{DueReminder, due_reminders};
pub use store::{NewProduct, RecordStore, StoreError, StoreResult};
