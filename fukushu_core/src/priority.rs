//! Priority scoring for review items.
//!
//! Scores enforce a strict urgency ordering across four tiers:
//! never practiced > overdue > due soon > far future / legacy. Each tier
//! occupies its own score band so the selector can rank across tiers
//! without further rules.

use crate::ReviewItem;
use chrono::{DateTime, Utc};

/// Score for items that have never completed a practice session
pub const NEVER_PRACTICED_SCORE: f64 = 1000.0;

/// Base score for due or overdue items
pub const OVERDUE_BASE_SCORE: f64 = 500.0;

/// Overdue bonus per day, saturating at [`OVERDUE_BONUS_CAP`]
pub const OVERDUE_BONUS_PER_DAY: f64 = 10.0;

/// Maximum overdue bonus (reached 20 days past due)
pub const OVERDUE_BONUS_CAP: f64 = 200.0;

/// Score of an item due right now; decays per day until due
pub const UPCOMING_BASE_SCORE: f64 = 100.0;

/// Upcoming decay per day; items 20+ days out score zero
pub const UPCOMING_DECAY_PER_DAY: f64 = 5.0;

/// Score for items practiced at least once but with no recorded due date
pub const LEGACY_SCORE: f64 = 50.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Compute the urgency score for a review item at a given time.
///
/// Pure; ties are resolved later by the selector's shuffle, so no total
/// order is imposed here.
pub fn priority_score(item: &ReviewItem, now: DateTime<Utc>) -> f64 {
    // Never practiced outranks everything previously practiced
    if item.last_practiced.is_none() {
        return NEVER_PRACTICED_SCORE;
    }

    match item.next_practice {
        // Due or overdue: grows with how late the review is, range [500, 700]
        Some(next) if next <= now => {
            let days_overdue = (now - next).num_milliseconds() as f64 / MILLIS_PER_DAY;
            OVERDUE_BASE_SCORE + (days_overdue * OVERDUE_BONUS_PER_DAY).min(OVERDUE_BONUS_CAP)
        }

        // Not yet due: decays to zero by 20 days out, never negative
        Some(next) => {
            let days_until_due = (next - now).num_milliseconds() as f64 / MILLIS_PER_DAY;
            (UPCOMING_BASE_SCORE - days_until_due * UPCOMING_DECAY_PER_DAY).max(0.0)
        }

        // Practiced but no due date recorded: moderately important
        None => LEGACY_SCORE,
    }
}
