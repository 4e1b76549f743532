//! Learning streak over lesson-completion timestamps.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, Utc};

/// Number of consecutive UTC calendar days, ending at `today`, on which at
/// least one lesson was completed.
///
/// Several completions on one day count once. No completion today gives 0.
pub fn learning_streak(completions: &[DateTime<Utc>], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = completions.iter().map(|t| t.date_naive()).collect();

    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
