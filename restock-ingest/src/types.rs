use serde::{Deserialize, Serialize};

/// Normalized output of receipt-text extraction (source-agnostic).
///
/// Transient: consumed once by ingestion, never persisted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedLineItem {
    pub name: String,
    pub price: Option<f64>,
    /// Free-text category guess; the engine resolves it to a known category.
    pub category_guess: String,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
    pub quantity: u32,
}
