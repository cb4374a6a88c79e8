//! Per-account accumulation of signed values by period.

use flux_core::{Granularity, PeriodKey};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Which signs a contribution may have to be accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignPolicy {
    /// Every value, including zero.
    #[default]
    AcceptAll,
    /// Strictly positive values only.
    PositiveOnly,
    /// Strictly negative values only.
    NegativeOnly,
}

impl SignPolicy {
    /// Whether `value` passes this policy.
    #[must_use]
    pub fn admits(self, value: Decimal) -> bool {
        match self {
            Self::AcceptAll => true,
            Self::PositiveOnly => value > Decimal::ZERO,
            Self::NegativeOnly => value < Decimal::ZERO,
        }
    }
}

/// Accumulated values of one account.
///
/// Only touched periods are stored; every other period reads as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    name: String,
    periods: BTreeMap<PeriodKey, Decimal>,
    total: Decimal,
}

impl Bucket {
    /// Create an empty bucket.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            periods: BTreeMap::new(),
            total: Decimal::ZERO,
        }
    }

    /// Add `value` to `period` and to the running total.
    pub fn add(&mut self, period: PeriodKey, value: Decimal) {
        *self.periods.entry(period).or_insert(Decimal::ZERO) += value;
        self.total += value;
    }

    /// Account name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sum over every period.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Accumulated value for `period`, zero when untouched.
    #[must_use]
    pub fn value(&self, period: PeriodKey) -> Decimal {
        self.periods.get(&period).copied().unwrap_or(Decimal::ZERO)
    }

    /// Touched periods and their values, ascending.
    pub fn periods(&self) -> impl Iterator<Item = (PeriodKey, Decimal)> + '_ {
        self.periods.iter().map(|(p, v)| (*p, *v))
    }

    /// Earliest touched period.
    #[must_use]
    pub fn first_period(&self) -> Option<PeriodKey> {
        self.periods.keys().next().copied()
    }

    /// Latest touched period.
    #[must_use]
    pub fn last_period(&self) -> Option<PeriodKey> {
        self.periods.keys().next_back().copied()
    }

    /// Inclusive number of elapsed periods between the first and last
    /// touched period.
    #[must_use]
    pub fn span(&self, granularity: Granularity) -> Option<u32> {
        Some(granularity.span(self.first_period()?, self.last_period()?))
    }

    /// Whether no period was touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Buckets keyed by account name, created on first contribution.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    buckets: HashMap<String, Bucket>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `value` for `account` in `period` if `policy` admits it.
    ///
    /// Contributions are additive: repeating a call doubles its effect.
    /// Returns whether the value was accumulated.
    pub fn contribute(
        &mut self,
        account: &str,
        period: PeriodKey,
        value: Decimal,
        policy: SignPolicy,
    ) -> bool {
        if !policy.admits(value) {
            return false;
        }
        let bucket = self.buckets.entry(account.to_string()).or_insert_with(|| {
            debug!(account, "creating bucket");
            Bucket::new(account)
        });
        bucket.add(period, value);
        true
    }

    /// Look up a bucket.
    #[must_use]
    pub fn get(&self, account: &str) -> Option<&Bucket> {
        self.buckets.get(account)
    }

    /// Buckets sorted by account name.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Bucket> {
        let mut buckets: Vec<_> = self.buckets.values().collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        buckets
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no bucket exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
