//! Report options and their builder.

use crate::error::FluxError;
use crate::registry::Closure;
use flux_core::Granularity;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Output layout of the rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Account name followed by one value per period.
    Plain,
    /// Adds a numeric `Average` column.
    Averaged,
    /// Adds `Average`, `Line` and `Percent` formula columns and the
    /// `Total`/`Positive`/`Negative` summary rows.
    #[default]
    Spreadsheet,
}

/// How accounts are split into positive-flow and negative-flow groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PartitionMode {
    /// Route every contribution by its own sign; an account can appear in
    /// both groups.
    PerContribution,
    /// Group each account by the sign of its total.
    #[default]
    NetTotal,
    /// Keep every account in a single block.
    Undivided,
}

/// Divisor used for per-row averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AverageDivisor {
    /// Inclusive number of elapsed periods between the first and last
    /// observed period.
    #[default]
    Span,
    /// Number of report columns between the first and last observed period.
    Columns,
}

/// Fixed currency multipliers keyed by currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRates {
    rates: BTreeMap<String, Decimal>,
}

impl CurrencyRates {
    /// A table without any rate; every currency converts at 1.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
        }
    }

    /// Set the multiplier for `currency`.
    pub fn set(&mut self, currency: impl Into<String>, rate: Decimal) {
        self.rates.insert(currency.into(), rate);
    }

    /// The configured multiplier, if any.
    #[must_use]
    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Multiplier for `currency`, 1 when unknown.
    #[must_use]
    pub fn multiplier(&self, currency: &str) -> Decimal {
        self.get(currency).unwrap_or(Decimal::ONE)
    }

    /// Whether `currency` has a configured rate.
    #[must_use]
    pub fn contains(&self, currency: &str) -> bool {
        self.rates.contains_key(currency)
    }

    /// All rates, ordered by currency code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(c, r)| (c.as_str(), *r))
    }
}

impl Default for CurrencyRates {
    fn default() -> Self {
        let mut rates = Self::empty();
        rates.set("USD", Decimal::new(522, 2));
        rates.set("EUR", Decimal::new(615, 2));
        rates
    }
}

/// Parse a `CODE=RATE` assignment such as `USD=5.22`.
pub fn parse_rate(assignment: &str) -> Result<(String, Decimal), FluxError> {
    let invalid = || FluxError::InvalidOption(format!("expected CODE=RATE, got '{assignment}'"));
    let (code, rate) = assignment.split_once('=').ok_or_else(invalid)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(invalid());
    }
    let rate = Decimal::from_str(rate.trim()).map_err(|_| invalid())?;
    Ok((code.to_string(), rate))
}

/// Every strategy flag and constant of a report run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Output layout.
    pub layout: Layout,
    /// Period closure rule.
    pub closure: Closure,
    /// Positive/negative grouping.
    pub partition: PartitionMode,
    /// Average divisor strategy.
    pub averaging: AverageDivisor,
    /// Period width.
    pub granularity: Granularity,
    /// Currency multipliers.
    pub rates: CurrencyRates,
    /// Optional divisor applied after the currency multiplier.
    pub divisor: Option<Decimal>,
}

impl ReportOptions {
    /// Start building options from the defaults.
    pub fn builder() -> ReportOptionsBuilder {
        ReportOptionsBuilder::new()
    }

    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<(), FluxError> {
        if let Some(divisor) = self.divisor {
            if divisor <= Decimal::ZERO {
                return Err(FluxError::InvalidOption(format!(
                    "divisor must be positive, got {divisor}"
                )));
            }
        }
        if let Some((code, rate)) = self.rates.iter().find(|(_, r)| *r <= Decimal::ZERO) {
            return Err(FluxError::InvalidOption(format!(
                "rate for {code} must be positive, got {rate}"
            )));
        }
        Ok(())
    }
}

/// Builder for [`ReportOptions`].
#[derive(Debug, Default)]
pub struct ReportOptionsBuilder {
    options: ReportOptions,
}

impl ReportOptionsBuilder {
    /// Create a builder holding the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output layout.
    pub const fn layout(mut self, layout: Layout) -> Self {
        self.options.layout = layout;
        self
    }

    /// Set the closure rule.
    pub const fn closure(mut self, closure: Closure) -> Self {
        self.options.closure = closure;
        self
    }

    /// Set the partition mode.
    pub const fn partition(mut self, partition: PartitionMode) -> Self {
        self.options.partition = partition;
        self
    }

    /// Set the average divisor strategy.
    pub const fn averaging(mut self, averaging: AverageDivisor) -> Self {
        self.options.averaging = averaging;
        self
    }

    /// Set the period width.
    pub const fn granularity(mut self, granularity: Granularity) -> Self {
        self.options.granularity = granularity;
        self
    }

    /// Add or replace one currency rate.
    pub fn rate(mut self, currency: impl Into<String>, rate: Decimal) -> Self {
        self.options.rates.set(currency, rate);
        self
    }

    /// Replace the whole rate table.
    pub fn rates(mut self, rates: CurrencyRates) -> Self {
        self.options.rates = rates;
        self
    }

    /// Set the fixed divisor.
    pub const fn divisor(mut self, divisor: Option<Decimal>) -> Self {
        self.options.divisor = divisor;
        self
    }

    /// Validate and return the options.
    pub fn build(self) -> Result<ReportOptions, FluxError> {
        self.options.validate()?;
        Ok(self.options)
    }
}
