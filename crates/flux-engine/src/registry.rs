//! The set of report periods and the closure rule that admits them.

use chrono::NaiveDate;
use flux_core::{Granularity, PeriodKey};
use std::collections::BTreeSet;
use tracing::debug;

/// Which periods are closed relative to the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Closure {
    /// Only periods strictly before the current one; the in-progress period
    /// never reaches the report.
    #[default]
    Strict,
    /// Periods up to and including the current one.
    Inclusive,
}

impl Closure {
    /// Whether `period` is admitted when `current` is in progress.
    #[must_use]
    pub fn admits(self, period: PeriodKey, current: PeriodKey) -> bool {
        match self {
            Self::Strict => period < current,
            Self::Inclusive => period <= current,
        }
    }
}

/// Periods observed so far, filtered by a [`Closure`] rule.
///
/// The current period is fixed when the registry is created, so every
/// occurrence of the same period gets the same verdict within a run.
#[derive(Debug, Clone)]
pub struct PeriodRegistry {
    periods: BTreeSet<PeriodKey>,
    current: PeriodKey,
    closure: Closure,
    granularity: Granularity,
}

impl PeriodRegistry {
    /// Create a registry with an explicit current period.
    #[must_use]
    pub fn new(current: PeriodKey, closure: Closure, granularity: Granularity) -> Self {
        Self {
            periods: BTreeSet::new(),
            current: granularity.truncate(current),
            closure,
            granularity,
        }
    }

    /// Create a registry whose current period contains `today`.
    #[must_use]
    pub fn for_today(today: NaiveDate, closure: Closure, granularity: Granularity) -> Self {
        Self::new(granularity.period_of(today), closure, granularity)
    }

    /// Register `period` if the closure rule admits it.
    pub fn accept(&mut self, period: PeriodKey) -> bool {
        if !self.closure.admits(period, self.current) {
            debug!(%period, current = %self.current, "rejecting open period");
            return false;
        }
        if self.periods.insert(period) {
            debug!(%period, "registered period");
        }
        true
    }

    /// The in-progress period.
    #[must_use]
    pub const fn current(&self) -> PeriodKey {
        self.current
    }

    /// Period width.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Registered periods in ascending order.
    pub fn periods(&self) -> impl Iterator<Item = PeriodKey> + '_ {
        self.periods.iter().copied()
    }

    /// Whether `period` has been registered.
    #[must_use]
    pub fn contains(&self, period: PeriodKey) -> bool {
        self.periods.contains(&period)
    }

    /// Zero-based column of `period` in ascending order.
    #[must_use]
    pub fn position(&self, period: PeriodKey) -> Option<usize> {
        if self.contains(period) {
            Some(self.periods.range(..period).count())
        } else {
            None
        }
    }

    /// Earliest registered period.
    #[must_use]
    pub fn first(&self) -> Option<PeriodKey> {
        self.periods.first().copied()
    }

    /// Latest registered period.
    #[must_use]
    pub fn last(&self) -> Option<PeriodKey> {
        self.periods.last().copied()
    }

    /// Inclusive period count from the first to the last registered period.
    #[must_use]
    pub fn span(&self) -> Option<u32> {
        Some(self.granularity.span(self.first()?, self.last()?))
    }

    /// Number of registered periods within `first..=last`.
    #[must_use]
    pub fn count_between(&self, first: PeriodKey, last: PeriodKey) -> usize {
        if last < first {
            return 0;
        }
        self.periods.range(first..=last).count()
    }

    /// Number of registered periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}
