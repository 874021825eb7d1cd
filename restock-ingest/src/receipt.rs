//! Receipt text parser: turns OCR'd receipt text into line items.
//!
//! Expected shape, one item per line, price at the end:
//!
//!   Laundry Detergent      ¥298
//!   Soy Sauce x2           $4.58
//!
//! Lines without a price or without a recognizable product keyword are
//! skipped; headers, separators and totals fall out naturally that way.

use anyhow::Result;
use regex::Regex;

use crate::types::ExtractedLineItem;

/// Keyword table for category guessing. First hit wins, checked in order.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "detergent",
        &["detergent", "laundry", "bleach", "softener", "stain remover"],
    ),
    (
        "condiment",
        &[
            "soy sauce", "miso", "vinegar", "mirin", "ketchup", "mustard", "sugar", "salt",
            "pepper", "cooking oil", "olive oil",
        ],
    ),
    (
        "personal-care",
        &["lotion", "cream", "toner", "serum", "cotton", "swab"],
    ),
    (
        "toiletry",
        &[
            "toothpaste", "toothbrush", "shampoo", "conditioner", "soap", "body wash", "mouthwash",
        ],
    ),
    (
        "household",
        &[
            "tissue", "toilet paper", "paper towel", "battery", "batteries", "trash bag",
            "sponge", "wipes",
        ],
    ),
];

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_HIT: f64 = 0.1;

/// Guess a category from product-name keywords. `None` means the line does
/// not look like a tracked consumable.
fn guess_category(name: &str) -> Option<(&'static str, f64)> {
    let lowered = name.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = keywords.iter().filter(|k| lowered.contains(*k)).count();
        if hits > 0 {
            let confidence = (BASE_CONFIDENCE + hits as f64 * CONFIDENCE_PER_HIT).min(1.0);
            return Some((category, confidence));
        }
    }
    None
}

/// Extract line items from receipt text.
pub fn extract_line_items(text: &str) -> Result<Vec<ExtractedLineItem>> {
    // "¥298" or "$4.58" / "4.58" at end of line.
    let yen_re = Regex::new(r"¥\s*(?P<amount>[\d,]+)")?;
    let decimal_re = Regex::new(r"\$?\s*(?P<amount>\d+\.\d{2})\s*$")?;
    let quantity_re = Regex::new(r"(?i)\bx\s*(?P<qty>\d+)\b")?;

    let mut items = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (price, price_start) = if let Some(caps) = yen_re.captures(line) {
            let amount: f64 = match caps["amount"].replace(",", "").parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            (amount, caps.get(0).map(|m| m.start()).unwrap_or(0))
        } else if let Some(caps) = decimal_re.captures(line) {
            let amount: f64 = match caps["amount"].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            (amount, caps.get(0).map(|m| m.start()).unwrap_or(0))
        } else {
            continue;
        };

        let mut name = line[..price_start].trim().to_string();

        let quantity = match quantity_re.captures(&name) {
            Some(caps) => {
                let qty: u32 = caps["qty"].parse().unwrap_or(1);
                name = quantity_re.replace(&name, "").trim().to_string();
                qty.max(1)
            }
            None => 1,
        };

        if name.chars().count() < 2 {
            continue;
        }

        let Some((category, confidence)) = guess_category(&name) else {
            continue;
        };

        items.push(ExtractedLineItem {
            name,
            price: Some(price),
            category_guess: category.to_string(),
            confidence,
            quantity,
        });
    }

    Ok(items)
}
