//! Calendar-date streak arithmetic for the consecutive-days condition.

use chrono::NaiveDate;

/// Length of the longest run of consecutive calendar dates in `dates`.
///
/// Input order and duplicates do not matter; the streak is over distinct
/// dates, not 24-hour rolling windows.
pub(crate) fn longest_run(dates: &[NaiveDate]) -> u64 {
    let mut sorted: Vec<NaiveDate> = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut best: u64 = 0;
    let mut current: u64 = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in sorted {
        current = match previous {
            Some(prev) if prev.succ_opt() == Some(date) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(date);
    }
    best
}
