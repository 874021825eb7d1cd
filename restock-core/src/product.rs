//! Product model for household consumables.
//!
//! A product tracks two consumption-pace numbers: the category-level prior
//! it was created with, and the adaptive estimate that `crate::pace` refines
//! from real purchase history.

use serde::{Deserialize, Serialize};

/// Prior for categories we have no table entry for.
pub const GENERIC_CONSUMPTION_DAYS: i64 = 30;

/// Open set of product categories. Extraction produces free-text guesses,
/// so anything we do not recognize lands in `Other` with the generic prior.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "detergent")]
    Detergent,
    #[serde(rename = "condiment")]
    Condiment,
    #[serde(rename = "personal-care")]
    PersonalCare,
    #[serde(rename = "toiletry")]
    Toiletry,
    #[serde(rename = "household")]
    Household,
    #[serde(untagged)]
    Other(String),
}

impl Category {
    /// Resolve a free-text category guess to a known category.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "detergent" => Category::Detergent,
            "condiment" => Category::Condiment,
            "personal-care" | "personal care" => Category::PersonalCare,
            "toiletry" | "toiletries" => Category::Toiletry,
            "household" => Category::Household,
            other => Category::Other(other.to_string()),
        }
    }

    /// How many days a freshly bought item of this category typically lasts.
    pub fn default_consumption_days(&self) -> i64 {
        match self {
            Category::Detergent => 60,
            Category::Condiment => 180,
            Category::PersonalCare => 90,
            Category::Toiletry => 90,
            Category::Household => 30,
            Category::Other(_) => GENERIC_CONSUMPTION_DAYS,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Detergent => "detergent",
            Category::Condiment => "condiment",
            Category::PersonalCare => "personal-care",
            Category::Toiletry => "toiletry",
            Category::Household => "household",
            Category::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked household product.
///
/// `current_consumption_days` starts at the category prior and is only ever
/// rewritten by the pace estimator. It stays strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub category: Category,
    pub default_consumption_days: i64,
    pub current_consumption_days: i64,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        household_id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
    ) -> Self {
        let default_days = category.default_consumption_days();
        Self {
            id: id.into(),
            household_id: household_id.into(),
            name: name.into(),
            category,
            default_consumption_days: default_days,
            current_consumption_days: default_days,
        }
    }
}
