//! SM-2 style schedule advancement.
//!
//! After each practice session an item's interval grows: 1 day, then
//! 3 days, then `interval * ease` rounded, capped at 180 days. Ease holds
//! constant (floored at 1.3); no recall-quality signal is consumed.

use crate::{PracticeSchedule, ReviewItem};
use chrono::{DateTime, Duration, Utc};

/// Ease factor assumed for items that have never recorded one
pub const DEFAULT_EASE: f64 = 2.5;

/// Ease never drops below this floor
pub const MIN_EASE: f64 = 1.3;

/// Interval assumed for items that have never recorded one
pub const DEFAULT_INTERVAL_DAYS: u32 = 1;

/// Intervals are capped here no matter how high ease climbs
pub const MAX_INTERVAL_DAYS: u32 = 180;

const FIRST_INTERVAL_DAYS: u32 = 1;
const SECOND_INTERVAL_DAYS: u32 = 3;

/// Compute the next schedule state for an item that was just practiced.
///
/// Total over any well-formed schedule state; absent fields take their
/// documented defaults. The caller persists the result.
pub fn advance(item: &ReviewItem, now: DateTime<Utc>) -> PracticeSchedule {
    let ease = item.practice_ease.unwrap_or(DEFAULT_EASE);
    let interval = item.practice_interval.unwrap_or(DEFAULT_INTERVAL_DAYS);
    let practice_count = item.practice_count + 1;

    let raw_interval = match practice_count {
        1 => FIRST_INTERVAL_DAYS,
        2 => SECOND_INTERVAL_DAYS,
        _ => (interval as f64 * ease).round() as u32,
    };

    let new_interval = raw_interval.min(MAX_INTERVAL_DAYS);
    let new_ease = ease.max(MIN_EASE);

    PracticeSchedule {
        practice_count,
        practice_interval: new_interval,
        practice_ease: new_ease,
        last_practiced: now,
        next_practice: now + Duration::days(new_interval as i64),
    }
}
