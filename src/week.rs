//! Monday-Sunday week windowing
//!
//! Every weekly aggregate in the analyzers is computed over a `WeekWindow`,
//! and every rolling baseline over the windows from [`WeekWindow::prior_windows`].

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable Monday-Sunday window. `end` is always `start + 6` days and
/// aggregates are computed over the inclusive range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// The window containing `reference`: the most recent Monday at or
    /// before it, through the following Sunday.
    pub fn containing(reference: NaiveDate) -> Self {
        let start = reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// Whether `date` falls inside the window (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The `n` immediately preceding non-overlapping 7-day windows, most
    /// recent first. Each window ends the day before the previous one starts.
    pub fn prior_windows(&self, n: usize) -> Vec<WeekWindow> {
        (0..n)
            .map(|i| {
                let end = self.start - Duration::days(1 + 7 * i as i64);
                WeekWindow {
                    start: end - Duration::days(6),
                    end,
                }
            })
            .collect()
    }
}

impl fmt::Display for WeekWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_totality() {
        // Every day of several consecutive weeks maps to a Monday-start
        // 7-day window containing it.
        let mut day = date(2026, 2, 1);
        for _ in 0..60 {
            let window = WeekWindow::containing(day);
            assert_eq!(window.start.weekday(), Weekday::Mon);
            assert_eq!(window.end - window.start, Duration::days(6));
            assert!(window.contains(day));
            day = day + Duration::days(1);
        }
    }

    #[test]
    fn test_monday_maps_to_itself() {
        let monday = date(2026, 2, 16);
        assert_eq!(monday.weekday(), Weekday::Mon);
        let window = WeekWindow::containing(monday);
        assert_eq!(window.start, monday);
        assert_eq!(window.end, date(2026, 2, 22));
    }

    #[test]
    fn test_sunday_maps_back_to_monday() {
        let sunday = date(2026, 2, 22);
        let window = WeekWindow::containing(sunday);
        assert_eq!(window.start, date(2026, 2, 16));
    }

    #[test]
    fn test_prior_windows_disjoint_and_preceding() {
        let window = WeekWindow::containing(date(2026, 2, 18));
        let priors = window.prior_windows(4);
        assert_eq!(priors.len(), 4);

        // Most recent first, each ending the day before the next one starts.
        assert_eq!(priors[0].end, window.start - Duration::days(1));
        for pair in priors.windows(2) {
            assert_eq!(pair[1].end, pair[0].start - Duration::days(1));
        }

        for (i, a) in priors.iter().enumerate() {
            assert!(a.end < window.start);
            assert_eq!(a.end - a.start, Duration::days(6));
            for b in priors.iter().skip(i + 1) {
                // Pairwise disjoint.
                assert!(a.start > b.end || b.start > a.end);
            }
        }
    }
}
