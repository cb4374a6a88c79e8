//! The account × period table fed by classified flows.

use crate::aggregate::{Bucket, Ledger, SignPolicy};
use crate::classify::Flow;
use crate::options::{AverageDivisor, PartitionMode, ReportOptions};
use crate::registry::PeriodRegistry;
use flux_core::PeriodKey;
use rust_decimal::Decimal;
use tracing::debug;

/// Accounts split into the two report groups, each sorted by name.
#[derive(Debug, Clone, Default)]
pub struct FlowGroups<'a> {
    /// Positive-flow accounts (the only group when undivided).
    pub positive: Vec<&'a Bucket>,
    /// Negative-flow accounts.
    pub negative: Vec<&'a Bucket>,
}

impl FlowGroups<'_> {
    /// Total number of rows across both groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Whether both groups are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Aggregated flows plus the period columns they fall into.
#[derive(Debug, Clone)]
pub struct FlowTable {
    partition: PartitionMode,
    averaging: AverageDivisor,
    registry: PeriodRegistry,
    /// All accounts, or only positive contributions when partitioning per
    /// contribution.
    inflows: Ledger,
    /// Negative contributions when partitioning per contribution.
    outflows: Ledger,
    positive: Bucket,
    negative: Bucket,
}

impl FlowTable {
    /// Create an empty table.
    #[must_use]
    pub fn new(registry: PeriodRegistry, options: &ReportOptions) -> Self {
        Self {
            partition: options.partition,
            averaging: options.averaging,
            registry,
            inflows: Ledger::new(),
            outflows: Ledger::new(),
            positive: Bucket::new("Positive"),
            negative: Bucket::new("Negative"),
        }
    }

    /// Accumulate `flow` unless its period is still open.
    ///
    /// Returns whether the period was admitted.
    pub fn record(&mut self, flow: &Flow) -> bool {
        if !self.registry.accept(flow.period) {
            return false;
        }

        let (account, period, value) = (flow.account.as_str(), flow.period, flow.value);
        match self.partition {
            PartitionMode::PerContribution => {
                let routed = self
                    .inflows
                    .contribute(account, period, value, SignPolicy::PositiveOnly)
                    || self
                        .outflows
                        .contribute(account, period, value, SignPolicy::NegativeOnly);
                if !routed {
                    debug!(account, %period, "dropping zero contribution");
                }
            }
            PartitionMode::NetTotal | PartitionMode::Undivided => {
                self.inflows
                    .contribute(account, period, value, SignPolicy::AcceptAll);
            }
        }

        if value > Decimal::ZERO {
            self.positive.add(period, value);
        } else if value < Decimal::ZERO {
            self.negative.add(period, value);
        }
        true
    }

    /// Accounts grouped for display.
    #[must_use]
    pub fn groups(&self) -> FlowGroups<'_> {
        match self.partition {
            PartitionMode::PerContribution => FlowGroups {
                positive: self.inflows.sorted(),
                negative: self.outflows.sorted(),
            },
            PartitionMode::NetTotal => {
                let (positive, negative): (Vec<_>, Vec<_>) = self
                    .inflows
                    .sorted()
                    .into_iter()
                    .partition(|b| b.total() >= Decimal::ZERO);
                FlowGroups { positive, negative }
            }
            PartitionMode::Undivided => FlowGroups {
                positive: self.inflows.sorted(),
                negative: Vec::new(),
            },
        }
    }

    /// Look up an account; under per-contribution partitioning the
    /// positive and negative parts are separate buckets.
    #[must_use]
    pub fn account(&self, name: &str) -> (Option<&Bucket>, Option<&Bucket>) {
        (self.inflows.get(name), self.outflows.get(name))
    }

    /// Average of `bucket` per period under the configured divisor.
    #[must_use]
    pub fn average(&self, bucket: &Bucket) -> Decimal {
        match (bucket.first_period(), bucket.last_period()) {
            (Some(first), Some(last)) => self.average_between(bucket.total(), first, last),
            _ => Decimal::ZERO,
        }
    }

    /// Average of `total` over the periods `first..=last`.
    #[must_use]
    pub fn average_between(&self, total: Decimal, first: PeriodKey, last: PeriodKey) -> Decimal {
        let divisor = match self.averaging {
            AverageDivisor::Span => self.registry.granularity().span(first, last) as usize,
            AverageDivisor::Columns => self.registry.count_between(first, last),
        };
        if divisor == 0 {
            return Decimal::ZERO;
        }
        total / Decimal::from(divisor)
    }

    /// The period columns.
    #[must_use]
    pub const fn registry(&self) -> &PeriodRegistry {
        &self.registry
    }

    /// Grouping mode.
    #[must_use]
    pub const fn partition(&self) -> PartitionMode {
        self.partition
    }

    /// Average divisor strategy.
    #[must_use]
    pub const fn averaging(&self) -> AverageDivisor {
        self.averaging
    }

    /// Sum of every positive contribution, by period.
    #[must_use]
    pub const fn positive_totals(&self) -> &Bucket {
        &self.positive
    }

    /// Sum of every negative contribution, by period.
    #[must_use]
    pub const fn negative_totals(&self) -> &Bucket {
        &self.negative
    }

    /// Number of account rows.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.inflows.len() + self.outflows.len()
    }
}
