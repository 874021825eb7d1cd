//! Consumption-pace estimator.
//!
//! Learns how many days a product lasts in a given household by averaging
//! the gaps between its most recent purchases and blending that into the
//! running estimate. The blend damps single anomalous gaps (a stock-up trip,
//! a forgotten receipt) instead of chasing them.

use serde::{Deserialize, Serialize};

use crate::purchase::PurchaseEvent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacePolicy {
    /// How many recent purchases to look at, including the one just recorded.
    pub window: usize,
    /// Weight of the current estimate in the blend.
    pub old_weight: f64,
    /// Weight of the freshly observed average gap.
    pub new_weight: f64,
}

impl Default for PacePolicy {
    fn default() -> Self {
        Self {
            window: 3,
            old_weight: 0.3,
            new_weight: 0.7,
        }
    }
}

/// What the estimator decided for one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceOutcome {
    /// New value for `current_consumption_days`.
    Updated(i64),
    /// Fewer than two purchases in the window; estimate left alone.
    InsufficientHistory,
    /// Observed average gap was zero or negative (same-day rebuys, clock
    /// skew); treated as noise, estimate left alone.
    NoisyInterval,
}

impl PaceOutcome {
    /// The estimate after this outcome, given the value before it.
    pub fn days_or(self, current: i64) -> i64 {
        match self {
            PaceOutcome::Updated(days) => days,
            PaceOutcome::InsufficientHistory | PaceOutcome::NoisyInterval => current,
        }
    }
}

/// Refresh the consumption estimate from purchase history.
///
/// `events_newest_first` must be sorted newest-first and include the purchase
/// that was just recorded. Gaps are whole days between adjacent events,
/// averaged with truncating integer division, then blended:
/// `floor(old * old_weight + avg_gap * new_weight)`.
pub fn update_pace(
    current_days: i64,
    events_newest_first: &[PurchaseEvent],
    policy: &PacePolicy,
) -> PaceOutcome {
    let take = events_newest_first.len().min(policy.window);
    let recent = &events_newest_first[..take];

    if recent.len() < 2 {
        return PaceOutcome::InsufficientHistory;
    }

    let gaps: Vec<i64> = recent
        .windows(2)
        .map(|pair| (pair[0].purchased_at - pair[1].purchased_at).num_days())
        .collect();
    let avg_gap = gaps.iter().sum::<i64>() / gaps.len() as i64;

    if avg_gap <= 0 {
        return PaceOutcome::NoisyInterval;
    }

    let blended =
        (current_days as f64 * policy.old_weight + avg_gap as f64 * policy.new_weight).floor()
            as i64;
    PaceOutcome::Updated(blended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: &str, y: i32, m: u32, d: u32) -> PurchaseEvent {
        PurchaseEvent::new(
            id,
            "p1",
            "u1",
            None,
            1,
            Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_single_purchase_leaves_estimate_alone() {
        let history = vec![event("e1", 2024, 1, 10)];
        let out = update_pace(60, &history, &PacePolicy::default());
        assert_eq!(out, PaceOutcome::InsufficientHistory);
        assert_eq!(out.days_or(60), 60);
    }

    #[test]
    fn test_empty_history_leaves_estimate_alone() {
        let out = update_pace(60, &[], &PacePolicy::default());
        assert_eq!(out, PaceOutcome::InsufficientHistory);
    }

    #[test]
    fn test_blend_example() {
        // Gaps of 40 days each; old estimate 60.
        // floor(60 * 0.3 + 40 * 0.7) = floor(18 + 28) = 46.
        let history = vec![
            event("e3", 2024, 3, 21),
            event("e2", 2024, 2, 10),
            event("e1", 2024, 1, 1),
        ];
        let out = update_pace(60, &history, &PacePolicy::default());
        assert_eq!(out, PaceOutcome::Updated(46));
    }

    #[test]
    fn test_gap_average_truncates() {
        // Gaps 7 and 10 days: average = 17 / 2 = 8 (truncated).
        // floor(30 * 0.3 + 8 * 0.7) = floor(9 + 5.6) = 14.
        let history = vec![
            event("e3", 2024, 1, 18),
            event("e2", 2024, 1, 11),
            event("e1", 2024, 1, 1),
        ];
        assert_eq!(
            update_pace(30, &history, &PacePolicy::default()),
            PaceOutcome::Updated(14)
        );
    }

    #[test]
    fn test_same_day_rebuys_are_noise() {
        let history = vec![event("e2", 2024, 1, 10), event("e1", 2024, 1, 10)];
        let out = update_pace(60, &history, &PacePolicy::default());
        assert_eq!(out, PaceOutcome::NoisyInterval);
        assert_eq!(out.days_or(60), 60);
    }

    #[test]
    fn test_window_ignores_older_events() {
        // Fourth event, a year earlier, must not widen the average.
        let history = vec![
            event("e4", 2024, 3, 21),
            event("e3", 2024, 2, 10),
            event("e2", 2024, 1, 1),
            event("e1", 2023, 1, 1),
        ];
        assert_eq!(
            update_pace(60, &history, &PacePolicy::default()),
            PaceOutcome::Updated(46)
        );
    }
}
