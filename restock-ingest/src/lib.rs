//! restock-ingest: receipt-text extraction into normalized line items.

pub mod receipt;
pub mod types;

#[cfg(feature = "vision")]
pub mod vision;

pub use receipt::extract_line_items;
pub use types::ExtractedLineItem;
