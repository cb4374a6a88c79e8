//! Calendar periods used as report columns.
//!
//! A [`PeriodKey`] is a `(year, month)` pair. It orders chronologically, hashes
//! structurally and prints in the canonical zero-padded `YYYY-MM` form, so the
//! same value serves as a map key, a sort key and a column label.
//!
//! A [`Granularity`] decides how dates are truncated into periods. Coarser
//! periods are keyed by their first month, so a quarter starting in April is
//! printed as `2020-04`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a period label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period '{input}': expected YYYY-MM")]
pub struct PeriodParseError {
    /// The rejected input.
    pub input: String,
}

/// A calendar bucket identified by its first month.
///
/// Field order matters: the derived ordering compares `year` first, then
/// `month`, which is exactly the ordering of the canonical string form.
///
/// # Examples
///
/// ```
/// use flux_core::PeriodKey;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2020, 3, 15).unwrap();
/// let period = PeriodKey::from_date(date);
/// assert_eq!(period.to_string(), "2020-03");
/// assert!(period < PeriodKey::new(2020, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Create a period from a year and a month in `1..=12`.
    ///
    /// Out-of-range months are clamped into `1..=12`.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }

    /// The monthly period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The month, `1..=12`.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Arithmetic month index (`year * 12 + month`).
    ///
    /// Differences between indices count elapsed months, including across
    /// year boundaries, which the `YYYYMM` integer reading does not.
    #[must_use]
    pub const fn month_index(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64
    }

    /// Inverse of [`month_index`](Self::month_index).
    #[must_use]
    pub fn from_month_index(index: i64) -> Self {
        let zero_based = index - 1;
        let year = zero_based.div_euclid(12) as i32;
        let month = zero_based.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError {
            input: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

/// Width of a report period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One column per calendar month.
    #[default]
    Month,
    /// One column per calendar quarter.
    Quarter,
    /// One column per calendar year.
    Year,
}

impl Granularity {
    /// Number of months in one period.
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Month => 1,
            Self::Quarter => 3,
            Self::Year => 12,
        }
    }

    /// The period containing `date`.
    #[must_use]
    pub fn period_of(self, date: NaiveDate) -> PeriodKey {
        self.truncate(PeriodKey::from_date(date))
    }

    /// Align a monthly key to the start of its period.
    #[must_use]
    pub fn truncate(self, period: PeriodKey) -> PeriodKey {
        let width = self.months();
        let month = (period.month - 1) / width * width + 1;
        PeriodKey::new(period.year, month)
    }

    /// Inclusive number of periods from `first` to `last`.
    ///
    /// Always at least 1; a reversed range counts as a single period.
    #[must_use]
    pub fn span(self, first: PeriodKey, last: PeriodKey) -> u32 {
        let first = self.truncate(first).month_index();
        let last = self.truncate(last).month_index();
        if last <= first {
            return 1;
        }
        ((last - first) / i64::from(self.months()) + 1) as u32
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month => write!(f, "month"),
            Self::Quarter => write!(f, "quarter"),
            Self::Year => write!(f, "year"),
        }
    }
}
