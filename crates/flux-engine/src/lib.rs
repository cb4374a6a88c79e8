//! Cash-flow aggregation engine.
//!
//! The engine turns a [`flux_core::Book`] into a period-by-account report of
//! money flowing in and out of a set of asset accounts:
//!
//! 1. [`AssetList`] decides which accounts hold balances.
//! 2. [`Classifier`] attributes each two-split transaction that touches
//!    exactly one asset account to its external account.
//! 3. [`PeriodRegistry`] collects the closed periods that become columns.
//! 4. [`FlowTable`] accumulates the attributed values per account and period.
//! 5. [`render`](render::render) writes the table as comma-separated text,
//!    optionally with spreadsheet formulas.
//!
//! # Example
//!
//! ```ignore
//! use flux_engine::{generate, AssetList, ReportOptions};
//!
//! let book = flux_loader::load("ledger.json".as_ref())?;
//! let assets = AssetList::parse("Assets:\n");
//! let today = chrono::Local::now().date_naive();
//! let csv = generate(&book, &assets, &ReportOptions::default(), today)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod assets;
pub mod classify;
pub mod error;
pub mod layout;
pub mod options;
pub mod registry;
pub mod render;
pub mod table;

pub use aggregate::{Bucket, Ledger, SignPolicy};
pub use assets::AssetList;
pub use classify::{Classifier, Flow};
pub use error::{FluxError, FluxResult, SplitSummary};
pub use options::{
    parse_rate, AverageDivisor, CurrencyRates, Layout, PartitionMode, ReportOptions,
    ReportOptionsBuilder,
};
pub use registry::{Closure, PeriodRegistry};
pub use render::{format_amount, render, write_report};
pub use table::{FlowGroups, FlowTable};

use chrono::NaiveDate;
use flux_core::Book;
use std::collections::HashSet;
use tracing::{info, warn};

/// Classify every transaction of `book` and aggregate the relevant ones.
///
/// Transactions are processed in book order; the first one without exactly
/// two splits aborts the whole run.
///
/// # Errors
///
/// Returns [`FluxError::Structural`] for a malformed transaction and
/// [`FluxError::InvalidOption`] when `options` fail validation.
pub fn build_table(
    book: &Book,
    assets: &AssetList,
    options: &ReportOptions,
    today: NaiveDate,
) -> FluxResult<FlowTable> {
    options.validate()?;

    let classifier = Classifier::new(assets, options);
    let registry = PeriodRegistry::for_today(today, options.closure, options.granularity);
    let mut table = FlowTable::new(registry, options);
    let mut unknown_currencies = HashSet::new();
    let mut relevant = 0usize;

    for transaction in book.transactions() {
        let Some(flow) = classifier.classify(book, transaction)? else {
            continue;
        };
        if !options.rates.contains(&transaction.currency)
            && unknown_currencies.insert(transaction.currency.clone())
        {
            warn!(currency = %transaction.currency, "unknown currency, converting at 1");
        }
        relevant += 1;
        table.record(&flow);
    }

    info!(
        transactions = book.transactions().len(),
        relevant,
        accounts = table.account_count(),
        periods = table.registry().len(),
        "built flow table"
    );
    Ok(table)
}

/// Build the table and render it in the configured layout.
///
/// # Errors
///
/// See [`build_table`]; rendering errors are reported as [`FluxError::Csv`].
pub fn generate(
    book: &Book,
    assets: &AssetList,
    options: &ReportOptions,
    today: NaiveDate,
) -> FluxResult<String> {
    let table = build_table(book, assets, options, today)?;
    render(&table, options.layout)
}
