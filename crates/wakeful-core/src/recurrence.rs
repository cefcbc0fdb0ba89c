//! Next-occurrence calculation.
//!
//! Pure date/time arithmetic: given an alarm definition and a reference
//! "now", compute the next instant the alarm should fire. No state, no
//! I/O, always returns an instant strictly after `now`.

use chrono::{Datelike, Duration, NaiveDateTime};

use crate::alarm::{AlarmDefinition, Recurrence, Weekday};

/// Upper bound on the day-by-day scan for weekday-set recurrences.
/// Day-of-week cycles repeat every 7 days, so a qualifying day is
/// always found within 8 candidates (today included) for a valid set.
const MAX_SCAN_DAYS: i64 = 8;

/// Compute the next trigger instant for `def`, strictly after `now`.
///
/// A candidate that lands exactly on `now` counts as already passed and
/// rolls forward, so an alarm never fires twice in the same instant.
pub fn next_occurrence(def: &AlarmDefinition, now: NaiveDateTime) -> NaiveDateTime {
    // Clamp keeps the function total even for an unvalidated definition.
    let hour = def.hour.min(23);
    let minute = def.minute.min(59);
    let today = now
        .date()
        .and_hms_opt(hour, minute, 0)
        .unwrap_or(now);

    match &def.recurrence {
        Recurrence::Once | Recurrence::Daily => {
            if today <= now {
                today + Duration::days(1)
            } else {
                today
            }
        }
        Recurrence::Weekend | Recurrence::Custom { .. } => {
            for offset in 0..MAX_SCAN_DAYS {
                let candidate = today + Duration::days(offset);
                let weekday = Weekday::from(candidate.weekday());
                if def.recurrence.matches_day(weekday) && candidate > now {
                    return candidate;
                }
            }
            // Unreachable with a valid non-empty set; bounded fallback.
            today + Duration::days(7)
        }
    }
}
