//! Year picker adapter.
//!
//! The form stores the year as a plain integer. Calendar dates only appear
//! here, to find "this year" and to bound stepping.

use chrono::{Datelike, NaiveDate, Utc};

use crate::model::MIN_YEAR;

/// Steps a stored year with the arrow keys, bounded by `[1900, today's year]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearPicker {
    today: NaiveDate,
}

impl Default for YearPicker {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl YearPicker {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// The latest selectable year.
    pub fn max_year(&self) -> i32 {
        self.today.year()
    }

    /// Moves `current` by `delta` years.
    ///
    /// An empty picker starts from the current year. A stored value outside
    /// the selectable range is pulled back into it.
    pub fn step(&self, current: Option<i32>, delta: i32) -> i32 {
        match current {
            None => self.max_year(),
            Some(year) => year
                .saturating_add(delta)
                .clamp(MIN_YEAR, self.max_year()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker() -> YearPicker {
        YearPicker::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn empty_starts_at_this_year() {
        assert_eq!(picker().step(None, -1), 2026);
        assert_eq!(picker().step(None, 10), 2026);
    }

    #[test]
    fn steps_within_range() {
        assert_eq!(picker().step(Some(2000), -1), 1999);
        assert_eq!(picker().step(Some(2000), 10), 2010);
    }

    #[test]
    fn clamps_to_bounds() {
        assert_eq!(picker().step(Some(2026), 1), 2026);
        assert_eq!(picker().step(Some(1905), -10), 1900);
        assert_eq!(picker().step(Some(2050), 0), 2026);
        assert_eq!(picker().step(Some(i32::MAX), 10), 2026);
    }
}
