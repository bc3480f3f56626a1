//! Lesson selection with priority-biased random sampling.
//!
//! Picking strictly by score would surface the same worst-overdue items in
//! every lesson. Instead the selector ranks candidates by score, keeps a
//! top tier three times the requested size, shuffles that tier uniformly,
//! and returns the front of the shuffle.

use crate::{priority_score, ReviewItem};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

/// The top tier holds `count * TOP_TIER_FACTOR` candidates (capped by pool size)
const TOP_TIER_FACTOR: usize = 3;

/// Select up to `count` items from a candidate pool.
///
/// Candidates are scored against `now` without being mutated. The RNG is
/// injected so callers can seed the shuffle; production callers pass
/// `rand::thread_rng()`.
pub fn select_for_lesson<R: Rng + ?Sized>(
    candidates: &[ReviewItem],
    now: DateTime<Utc>,
    count: usize,
    rng: &mut R,
) -> Vec<ReviewItem> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &ReviewItem)> = candidates
        .iter()
        .map(|item| (priority_score(item, now), item))
        .collect();

    // Highest priority first; scores are never NaN
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let tier_size = count.saturating_mul(TOP_TIER_FACTOR).min(scored.len());
    let top_tier = &mut scored[..tier_size];
    top_tier.shuffle(rng);

    top_tier
        .iter()
        .take(count.min(tier_size))
        .map(|(_, item)| (*item).clone())
        .collect()
}
