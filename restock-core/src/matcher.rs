//! Product matcher: resolves a free-text receipt name to a known product.
//!
//! Two phases: exact case-insensitive equality first, then a cheap fuzzy
//! score. The fuzzy score is deliberately simple (no edit distance) so it
//! stays predictable on short product names.

use serde::{Deserialize, Serialize};

use crate::product::Product;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Fuzzy matches at or below this score are rejected.
    pub similarity_threshold: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
        }
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

/// Similarity score in [0, 1] between two product names.
///
/// - 1.0 for equal normalized strings;
/// - `min(len) / max(len)` when one normalized string contains the other;
/// - otherwise the fraction of the shorter string's characters that appear
///   anywhere in the longer one (not symmetric in general).
pub fn similarity(a: &str, b: &str) -> f64 {
    let s1 = normalize(a);
    let s2 = normalize(b);

    if s1 == s2 {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let l1 = s1.chars().count();
    let l2 = s2.chars().count();

    if s1.contains(&s2) || s2.contains(&s1) {
        return l1.min(l2) as f64 / l1.max(l2) as f64;
    }

    let (longer, shorter) = if l1 >= l2 { (&s1, &s2) } else { (&s2, &s1) };
    let longer_len = l1.max(l2);
    let matches = shorter.chars().filter(|c| longer.contains(*c)).count();
    matches as f64 / longer_len as f64
}

/// Find the existing product a candidate name refers to, if any.
///
/// Ties between equal fuzzy scores go to the first product encountered,
/// so iteration order over `existing` matters to callers.
pub fn find_match<'a>(
    candidate: &str,
    existing: &'a [Product],
    policy: &MatchPolicy,
) -> Option<&'a Product> {
    let lowered = candidate.to_lowercase();
    if let Some(p) = existing.iter().find(|p| p.name.to_lowercase() == lowered) {
        return Some(p);
    }

    let mut best: Option<(&Product, f64)> = None;
    for product in existing {
        let score = similarity(candidate, &product.name);
        if score > policy.similarity_threshold
            && best.map_or(true, |(_, best_score)| score > best_score)
        {
            best = Some((product, score));
        }
    }
    best.map(|(p, _)| p)
}
