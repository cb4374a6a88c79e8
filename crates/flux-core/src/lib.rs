//! Core types for flux
//!
//! This crate provides the ledger-side model consumed by the flux engine:
//!
//! - [`Book`] - An account tree rooted at a sentinel, plus its transactions
//! - [`Account`] / [`AccountId`] - Nodes of the account tree
//! - [`Transaction`] / [`Split`] - Dated double-entry records and their legs
//! - [`PeriodKey`] - A calendar bucket used as a report column
//! - [`Granularity`] - How dates are truncated into periods
//!
//! # Example
//!
//! ```
//! use flux_core::{Book, Granularity, PeriodKey};
//! use chrono::NaiveDate;
//!
//! let mut book = Book::default();
//! let income = book.add_account("Income", None);
//! let salary = book.add_account("Salary", Some(income));
//! assert_eq!(book.full_name(salary), "Income:Salary");
//!
//! let date = NaiveDate::from_ymd_opt(2020, 8, 3).unwrap();
//! assert_eq!(Granularity::Quarter.period_of(date), PeriodKey::new(2020, 7));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod book;
pub mod period;

pub use book::{
    Account, AccountId, Book, Split, Transaction, ACCOUNT_SEPARATOR, DEFAULT_ROOT_NAME,
};
pub use period::{Granularity, PeriodKey, PeriodParseError};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
