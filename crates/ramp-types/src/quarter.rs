//! Calendar quarters and the planning periods built from them.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A quarter number outside `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("quarter must be between 1 and 4, got {0}")]
pub struct QuarterOutOfRange(pub u8);

/// One of the four calendar quarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quarter(u8);

impl Quarter {
    pub const Q1: Quarter = Quarter(1);
    pub const Q2: Quarter = Quarter(2);
    pub const Q3: Quarter = Quarter(3);
    pub const Q4: Quarter = Quarter(4);

    pub fn new(number: u8) -> Result<Self, QuarterOutOfRange> {
        if (1..=4).contains(&number) {
            Ok(Self(number))
        } else {
            Err(QuarterOutOfRange(number))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// First month of the quarter, 1-based (Q1 -> January).
    pub fn first_month(&self) -> u32 {
        (self.0 as u32 - 1) * 3 + 1
    }

    /// Last month of the quarter, 1-based (Q1 -> March).
    pub fn last_month(&self) -> u32 {
        self.0 as u32 * 3
    }

    /// The quarter a calendar date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self((date.month0() / 3 + 1) as u8)
    }
}

impl TryFrom<u8> for Quarter {
    type Error = QuarterOutOfRange;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Quarter::new(number)
    }
}

impl From<Quarter> for u8 {
    fn from(quarter: Quarter) -> u8 {
        quarter.0
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl FromStr for Quarter {
    type Err = QuarterOutOfRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix(['Q', 'q']).unwrap_or(trimmed);
        let number: u8 = digits.parse().map_err(|_| QuarterOutOfRange(u8::MAX))?;
        Quarter::new(number)
    }
}

/// A specific quarter of a specific year, the unit a roadmap covers.
///
/// Renders as `Q1 2025`, the form used in conflict messages and table
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanningPeriod {
    pub year: i32,
    pub quarter: Quarter,
}

impl PlanningPeriod {
    pub fn new(year: i32, quarter: Quarter) -> Self {
        Self { year, quarter }
    }

    /// The period containing today's date.
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    /// The period a calendar date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: Quarter::containing(date),
        }
    }

    /// First calendar day of the quarter.
    pub fn start_date(&self) -> NaiveDate {
        // Month is always one of 1/4/7/10, so this cannot fail for any
        // year chrono supports.
        NaiveDate::from_ymd_opt(self.year, self.quarter.first_month(), 1)
            .expect("quarter start is a valid date")
    }

    /// Last calendar day of the quarter, the day before the next
    /// quarter starts.
    pub fn end_date(&self) -> NaiveDate {
        self.next()
            .start_date()
            .pred_opt()
            .expect("quarter end is a valid date")
    }

    /// The quarter after this one, rolling into the next year after Q4.
    pub fn next(&self) -> Self {
        if self.quarter == Quarter::Q4 {
            Self::new(self.year + 1, Quarter::Q1)
        } else {
            Self::new(self.year, Quarter(self.quarter.0 + 1))
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }
}

impl fmt::Display for PlanningPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quarter, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_quarter_rejects_out_of_range() {
        assert!(Quarter::new(0).is_err());
        assert!(Quarter::new(5).is_err());
        assert_eq!(Quarter::new(2).unwrap(), Quarter::Q2);
    }

    #[test]
    fn test_quarter_parses_with_and_without_prefix() {
        assert_eq!("Q3".parse::<Quarter>().unwrap(), Quarter::Q3);
        assert_eq!("q1".parse::<Quarter>().unwrap(), Quarter::Q1);
        assert_eq!("4".parse::<Quarter>().unwrap(), Quarter::Q4);
        assert!("Q5".parse::<Quarter>().is_err());
        assert!("spring".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_period_bounds_cover_the_calendar() {
        let q1 = PlanningPeriod::new(2025, Quarter::Q1);
        assert_eq!(q1.start_date(), date(2025, 1, 1));
        assert_eq!(q1.end_date(), date(2025, 3, 31));

        let q2 = PlanningPeriod::new(2025, Quarter::Q2);
        assert_eq!(q2.start_date(), date(2025, 4, 1));
        assert_eq!(q2.end_date(), date(2025, 6, 30));

        let q3 = PlanningPeriod::new(2025, Quarter::Q3);
        assert_eq!(q3.start_date(), date(2025, 7, 1));
        assert_eq!(q3.end_date(), date(2025, 9, 30));

        let q4 = PlanningPeriod::new(2025, Quarter::Q4);
        assert_eq!(q4.start_date(), date(2025, 10, 1));
        assert_eq!(q4.end_date(), date(2025, 12, 31));
    }

    #[test]
    fn test_period_bounds_leap_year() {
        // Q1 always ends on March 31 whether or not February has 29
        // days, but the full quarter must still contain Feb 29.
        let q1 = PlanningPeriod::new(2024, Quarter::Q1);
        assert_eq!(q1.end_date(), date(2024, 3, 31));
        assert!(q1.contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_period_next_rolls_year() {
        let q4 = PlanningPeriod::new(2025, Quarter::Q4);
        assert_eq!(q4.next(), PlanningPeriod::new(2026, Quarter::Q1));
        let q2 = PlanningPeriod::new(2025, Quarter::Q2);
        assert_eq!(q2.next(), PlanningPeriod::new(2025, Quarter::Q3));
    }

    #[test]
    fn test_period_containing() {
        assert_eq!(
            PlanningPeriod::containing(date(2025, 3, 31)),
            PlanningPeriod::new(2025, Quarter::Q1)
        );
        assert_eq!(
            PlanningPeriod::containing(date(2025, 4, 1)),
            PlanningPeriod::new(2025, Quarter::Q2)
        );
        assert_eq!(
            PlanningPeriod::containing(date(2025, 12, 31)),
            PlanningPeriod::new(2025, Quarter::Q4)
        );
    }

    #[test]
    fn test_period_display_matches_conflict_format() {
        let period = PlanningPeriod::new(2025, Quarter::Q1);
        assert_eq!(period.to_string(), "Q1 2025");
    }
}
