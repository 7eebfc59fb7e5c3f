//! Calendar arithmetic for class bookings
//!
//! Pure functions over `chrono` dates and times. Nothing here reads the
//! clock; callers pass "today" in so the studio's local offset stays a
//! backend concern.

use crate::errors::RangeError;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Time Windows
// ============================================================================

/// Half-open interval `[start, end)` within a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, RangeError> {
        if end <= start {
            return Err(RangeError::EmptyTimeWindow);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Touching windows (`a.end == b.start`) do not overlap
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Slot key used to group classes, e.g. `08:00-09:00`
    pub fn slot_label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

// ============================================================================
// Date Ranges
// ============================================================================

/// Inclusive date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvertedDateRange);
        }
        Ok(Self { start, end })
    }

    /// Build a range no longer than `max_days` days (inclusive)
    pub fn bounded(start: NaiveDate, end: NaiveDate, max_days: i64) -> Result<Self, RangeError> {
        let range = Self::new(start, end)?;
        if range.days() > max_days {
            return Err(RangeError::DateRangeTooLong { max_days });
        }
        Ok(range)
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let (start, end) = month_bounds(date);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month
        .map(|d| d - Duration::days(1))
        .unwrap_or(first);
    (first, last)
}

// ============================================================================
// Ages and Spans
// ============================================================================

/// Completed years between `from` and `today` (0 if `from` is in the future)
pub fn years_since(from: NaiveDate, today: NaiveDate) -> i32 {
    if from > today {
        return 0;
    }
    let mut years = today.year() - from.year();
    if (today.month(), today.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years.max(0)
}

/// Whole days from `from` to `today`, never negative
pub fn days_since(from: NaiveDate, today: NaiveDate) -> i64 {
    (today - from).num_days().max(0)
}

/// Classes per 30-day month, one decimal place; `None` before the first full day
pub fn average_per_month(total: i32, days: i64) -> Option<f64> {
    if days <= 0 {
        return None;
    }
    let months = days as f64 / 30.0;
    Some((total as f64 / months * 10.0).round() / 10.0)
}

/// Portuguese weekday label used in attendance reports
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Segunda",
        Weekday::Tue => "Terça",
        Weekday::Wed => "Quarta",
        Weekday::Thu => "Quinta",
        Weekday::Fri => "Sexta",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_window_rejects_empty_and_inverted() {
        assert_eq!(TimeWindow::new(t(9, 0), t(9, 0)), Err(RangeError::EmptyTimeWindow));
        assert_eq!(TimeWindow::new(t(10, 0), t(9, 0)), Err(RangeError::EmptyTimeWindow));
    }

    #[rstest]
    #[case((8, 0), (9, 0), (8, 30), (9, 30), true)]
    #[case((8, 0), (9, 0), (7, 30), (8, 30), true)]
    #[case((8, 0), (10, 0), (8, 30), (9, 0), true)]
    #[case((8, 30), (9, 0), (8, 0), (10, 0), true)]
    #[case((8, 0), (9, 0), (9, 0), (10, 0), false)]
    #[case((9, 0), (10, 0), (8, 0), (9, 0), false)]
    #[case((8, 0), (9, 0), (11, 0), (12, 0), false)]
    fn test_overlap_cases(
        #[case] a: (u32, u32),
        #[case] a_end: (u32, u32),
        #[case] b: (u32, u32),
        #[case] b_end: (u32, u32),
        #[case] expected: bool,
    ) {
        let w1 = TimeWindow::new(t(a.0, a.1), t(a_end.0, a_end.1)).unwrap();
        let w2 = TimeWindow::new(t(b.0, b.1), t(b_end.0, b_end.1)).unwrap();
        assert_eq!(w1.overlaps(&w2), expected);
    }

    #[test]
    fn test_window_duration_and_label() {
        let w = TimeWindow::new(t(7, 30), t(8, 45)).unwrap();
        assert_eq!(w.duration_minutes(), 75);
        assert_eq!(w.slot_label(), "07:30-08:45");
    }

    #[rstest]
    #[case(d(2024, 2, 14), d(2024, 2, 1), d(2024, 2, 29))]
    #[case(d(2023, 2, 1), d(2023, 2, 1), d(2023, 2, 28))]
    #[case(d(2024, 12, 31), d(2024, 12, 1), d(2024, 12, 31))]
    #[case(d(2024, 4, 30), d(2024, 4, 1), d(2024, 4, 30))]
    fn test_month_bounds(#[case] date: NaiveDate, #[case] first: NaiveDate, #[case] last: NaiveDate) {
        assert_eq!(month_bounds(date), (first, last));
    }

    #[test]
    fn test_date_range_validation() {
        assert!(DateRange::new(d(2024, 1, 2), d(2024, 1, 1)).is_err());
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 1)).unwrap();
        assert_eq!(range.days(), 1);
        assert!(range.contains(d(2024, 1, 1)));
        assert_eq!(
            DateRange::bounded(d(2024, 1, 1), d(2024, 12, 31), 31),
            Err(RangeError::DateRangeTooLong { max_days: 31 })
        );
    }

    #[test]
    fn test_years_since_respects_birthday() {
        let birth = d(1990, 6, 15);
        assert_eq!(years_since(birth, d(2024, 6, 14)), 33);
        assert_eq!(years_since(birth, d(2024, 6, 15)), 34);
        assert_eq!(years_since(d(2030, 1, 1), d(2024, 1, 1)), 0);
    }

    #[test]
    fn test_average_per_month() {
        assert_eq!(average_per_month(10, 0), None);
        assert_eq!(average_per_month(30, 90), Some(10.0));
        assert_eq!(average_per_month(7, 45), Some(4.7));
    }

    fn window() -> impl Strategy<Value = TimeWindow> {
        (0u32..1439, 1u32..240).prop_map(|(start, len)| {
            let end = (start + len).min(1439);
            let end = if end == start { start + 1 } else { end };
            TimeWindow::new(t(start / 60, start % 60), t(end / 60, end % 60)).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_overlap_is_symmetric(a in window(), b in window()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_window_overlaps_itself(a in window()) {
            prop_assert!(a.overlaps(&a));
        }

        /// Overlap agrees with "some minute lies in both windows"
        #[test]
        fn prop_overlap_matches_shared_minute(a in window(), b in window()) {
            let shared = a.start().max(b.start()) < a.end().min(b.end());
            prop_assert_eq!(a.overlaps(&b), shared);
        }
    }
}
