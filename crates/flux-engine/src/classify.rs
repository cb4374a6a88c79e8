//! Attribution of a two-split transaction to one external account.
//!
//! A transaction is relevant when exactly one of its splits belongs to an
//! asset account. The other split names the external (flow) account and the
//! asset split supplies the signed value, converted by the currency
//! multiplier and the optional fixed divisor.

use crate::assets::AssetList;
use crate::error::{FluxError, SplitSummary};
use crate::options::{CurrencyRates, ReportOptions};
use flux_core::{Book, Granularity, PeriodKey, Split, Transaction};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// A value attributed to an external account in one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    /// Fully-qualified name of the non-asset account.
    pub account: String,
    /// Converted, signed value.
    pub value: Decimal,
    /// Period of the transaction date.
    pub period: PeriodKey,
}

/// Classifies transactions against an asset list.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    assets: &'a AssetList,
    rates: &'a CurrencyRates,
    divisor: Option<Decimal>,
    granularity: Granularity,
}

impl<'a> Classifier<'a> {
    /// Create a classifier using the rates, divisor and granularity of
    /// `options`.
    #[must_use]
    pub const fn new(assets: &'a AssetList, options: &'a ReportOptions) -> Self {
        Self {
            assets,
            rates: &options.rates,
            divisor: options.divisor,
            granularity: options.granularity,
        }
    }

    /// Attribute `transaction` to an external account.
    ///
    /// Returns `Ok(None)` when both or neither split is an asset.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::Structural`] when the transaction does not have
    /// exactly two splits.
    pub fn classify(&self, book: &Book, transaction: &Transaction) -> Result<Option<Flow>, FluxError> {
        let [first, second] = transaction.splits.as_slice() else {
            return Err(structural_error(book, transaction));
        };

        let first_name = book.full_name(first.account);
        let second_name = book.full_name(second.account);

        let (asset, other_name) = match (
            self.assets.is_asset(first_name),
            self.assets.is_asset(second_name),
        ) {
            (true, true) => {
                debug!(first_name, second_name, "both assets, skipping transfer");
                return Ok(None);
            }
            (false, false) => {
                debug!(first_name, second_name, "no asset side, skipping");
                return Ok(None);
            }
            (true, false) => {
                debug!(asset = first_name, other = second_name, "classified");
                (first, second_name)
            }
            (false, true) => {
                debug!(asset = second_name, other = first_name, "classified");
                (second, first_name)
            }
        };

        if !transaction.is_balanced() {
            warn!(
                date = %transaction.date,
                sum = %transaction.split_sum(),
                "transaction splits do not balance"
            );
        }

        Ok(Some(Flow {
            account: other_name.to_string(),
            value: self.convert(asset, &transaction.currency),
            period: self.granularity.period_of(transaction.date),
        }))
    }

    /// Multiplier applied to values in `currency`.
    #[must_use]
    pub fn multiplier(&self, currency: &str) -> Decimal {
        self.rates.multiplier(currency)
    }

    fn convert(&self, split: &Split, currency: &str) -> Decimal {
        let value = split.value * self.multiplier(currency);
        match self.divisor {
            Some(divisor) => value / divisor,
            None => value,
        }
    }
}

fn structural_error(book: &Book, transaction: &Transaction) -> FluxError {
    FluxError::Structural {
        date: transaction.date,
        splits: transaction
            .splits
            .iter()
            .map(|s| SplitSummary {
                account: book.full_name(s.account).to_string(),
                value: s.value,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flux_core::AccountId;
    use rust_decimal_macros::dec;

    struct Fixture {
        book: Book,
        checking: AccountId,
        savings: AccountId,
        food: AccountId,
        salary: AccountId,
        assets: AssetList,
    }

    fn fixture() -> Fixture {
        let mut book = Book::default();
        let assets_root = book.add_account("Assets", None);
        let checking = book.add_account("Checking", Some(assets_root));
        let savings = book.add_account("Savings", Some(assets_root));
        let expenses = book.add_account("Expenses", None);
        let food = book.add_account("Food", Some(expenses));
        let income = book.add_account("Income", None);
        let salary = book.add_account("Salary", Some(income));
        Fixture {
            book,
            checking,
            savings,
            food,
            salary,
            assets: AssetList::new(["Assets:"]),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 15).unwrap()
    }

    fn unit_options() -> ReportOptions {
        ReportOptions::builder()
            .rates(CurrencyRates::empty())
            .build()
            .unwrap()
    }

    #[test]
    fn test_asset_first_split() {
        let f = fixture();
        let options = unit_options();
        let classifier = Classifier::new(&f.assets, &options);
        let txn = Transaction::new(date(), "BRL")
            .with_split(f.checking, dec!(-42.10))
            .with_split(f.food, dec!(42.10));

        let flow = classifier.classify(&f.book, &txn).unwrap().unwrap();
        assert_eq!(flow.account, "Expenses:Food");
        assert_eq!(flow.value, dec!(-42.10));
        assert_eq!(flow.period, PeriodKey::new(2020, 3));
    }

    #[test]
    fn test_asset_second_split_keeps_raw_sign() {
        let f = fixture();
        let options = unit_options();
        let classifier = Classifier::new(&f.assets, &options);
        let txn = Transaction::new(date(), "BRL")
            .with_split(f.salary, dec!(-2000))
            .with_split(f.checking, dec!(2000));

        let flow = classifier.classify(&f.book, &txn).unwrap().unwrap();
        assert_eq!(flow.account, "Income:Salary");
        assert_eq!(flow.value, dec!(2000));
    }

    #[test]
    fn test_internal_transfer_is_irrelevant() {
        let f = fixture();
        let options = unit_options();
        let classifier = Classifier::new(&f.assets, &options);
        let txn = Transaction::new(date(), "BRL")
            .with_split(f.checking, dec!(-500))
            .with_split(f.savings, dec!(500));

        assert_eq!(classifier.classify(&f.book, &txn).unwrap(), None);
    }

    #[test]
    fn test_no_asset_side_is_irrelevant() {
        let f = fixture();
        let options = unit_options();
        let classifier = Classifier::new(&f.assets, &options);
        let txn = Transaction::new(date(), "BRL")
            .with_split(f.salary, dec!(-10))
            .with_split(f.food, dec!(10));

        assert_eq!(classifier.classify(&f.book, &txn).unwrap(), None);
    }

    #[test]
    fn test_currency_multiplier_and_divisor() {
        let f = fixture();
        let options = ReportOptions::builder()
            .divisor(Some(dec!(12)))
            .build()
            .unwrap();
        let classifier = Classifier::new(&f.assets, &options);

        let usd = Transaction::new(date(), "USD")
            .with_split(f.checking, dec!(120))
            .with_split(f.salary, dec!(-120));
        let flow = classifier.classify(&f.book, &usd).unwrap().unwrap();
        assert_eq!(flow.value, dec!(52.2));

        let unknown = Transaction::new(date(), "JPY")
            .with_split(f.checking, dec!(24))
            .with_split(f.salary, dec!(-24));
        let flow = classifier.classify(&f.book, &unknown).unwrap().unwrap();
        assert_eq!(flow.value, dec!(2));
    }

    #[test]
    fn test_three_splits_is_structural_error() {
        let f = fixture();
        let options = unit_options();
        let classifier = Classifier::new(&f.assets, &options);
        let txn = Transaction::new(date(), "BRL")
            .with_split(f.checking, dec!(10))
            .with_split(f.food, dec!(-6))
            .with_split(f.salary, dec!(-4));

        let err = classifier.classify(&f.book, &txn).unwrap_err();
        match &err {
            FluxError::Structural { splits, .. } => {
                let accounts: Vec<_> = splits.iter().map(|s| s.account.as_str()).collect();
                assert_eq!(accounts, ["Assets:Checking", "Expenses:Food", "Income:Salary"]);
            }
            other => panic!("expected structural error, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("(Assets:Checking, 10)"));
        assert!(message.contains("(Expenses:Food, -6)"));
        assert!(message.contains("(Income:Salary, -4)"));
    }

    #[test]
    fn test_single_split_is_structural_error() {
        let f = fixture();
        let options = unit_options();
        let classifier = Classifier::new(&f.assets, &options);
        let txn = Transaction::new(date(), "BRL").with_split(f.checking, dec!(10));
        assert!(classifier.classify(&f.book, &txn).unwrap_err().is_structural());
    }

    #[test]
    fn test_quarter_granularity_period() {
        let f = fixture();
        let options = ReportOptions::builder()
            .granularity(Granularity::Quarter)
            .build()
            .unwrap();
        let classifier = Classifier::new(&f.assets, &options);
        let txn = Transaction::new(date(), "BRL")
            .with_split(f.checking, dec!(1))
            .with_split(f.food, dec!(-1));
        let flow = classifier.classify(&f.book, &txn).unwrap().unwrap();
        assert_eq!(flow.period, PeriodKey::new(2020, 1));
    }
}
