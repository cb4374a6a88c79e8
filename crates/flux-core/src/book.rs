//! Ledger-side data model: accounts, splits and transactions.
//!
//! A [`Book`] owns an account tree rooted at a synthetic sentinel and the
//! list of transactions recorded against it. Accounts live in an arena and
//! are referenced by [`AccountId`]; a parent is always inserted before its
//! children, so the tree cannot contain cycles.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between path components of a fully-qualified account name.
pub const ACCOUNT_SEPARATOR: char = ':';

/// Default name of the root sentinel.
pub const DEFAULT_ROOT_NAME: &str = "Root Account";

/// Index of an account inside its [`Book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(usize);

impl AccountId {
    /// The raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the account tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Short name (one path component).
    pub name: String,
    /// Parent account, `None` only for the root sentinel.
    pub parent: Option<AccountId>,
}

impl Account {
    /// Whether this is the root sentinel.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// One leg of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// The owning account.
    pub account: AccountId,
    /// Signed value in the transaction currency.
    pub value: Decimal,
    /// Optional per-split memo.
    pub memo: Option<String>,
}

impl Split {
    /// Create a split without a memo.
    #[must_use]
    pub const fn new(account: AccountId, value: Decimal) -> Self {
        Self {
            account,
            value,
            memo: None,
        }
    }
}

/// A dated, single-currency transaction.
///
/// Well-formed transactions have exactly two splits whose values cancel out;
/// the model itself does not enforce either property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Posting date.
    pub date: NaiveDate,
    /// ISO currency code of the split values.
    pub currency: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The legs of the transaction.
    pub splits: Vec<Split>,
}

impl Transaction {
    /// Create a transaction with no splits.
    #[must_use]
    pub fn new(date: NaiveDate, currency: impl Into<String>) -> Self {
        Self {
            date,
            currency: currency.into(),
            description: None,
            splits: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a split.
    #[must_use]
    pub fn with_split(mut self, account: AccountId, value: Decimal) -> Self {
        self.splits.push(Split::new(account, value));
        self
    }

    /// Sum of all split values.
    #[must_use]
    pub fn split_sum(&self) -> Decimal {
        self.splits.iter().map(|s| s.value).sum()
    }

    /// Whether the split values sum to zero.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.split_sum().is_zero()
    }
}

/// An account tree plus the transactions recorded against it.
///
/// # Examples
///
/// ```
/// use flux_core::{Book, Transaction};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut book = Book::new("Root Account");
/// let expenses = book.add_account("Expenses", None);
/// let food = book.add_account("Food", Some(expenses));
/// assert_eq!(book.full_name(food), "Expenses:Food");
///
/// let checking = book.add_account("Checking", None);
/// let date = NaiveDate::from_ymd_opt(2020, 3, 15).unwrap();
/// book.add_transaction(
///     Transaction::new(date, "USD")
///         .with_split(checking, Decimal::from(-10))
///         .with_split(food, Decimal::from(10)),
/// );
/// assert_eq!(book.transactions().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    accounts: Vec<Account>,
    full_names: Vec<String>,
    transactions: Vec<Transaction>,
}

impl Book {
    /// Create an empty book whose root sentinel is called `root_name`.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            accounts: vec![Account {
                name: root_name.into(),
                parent: None,
            }],
            full_names: vec![String::new()],
            transactions: Vec::new(),
        }
    }

    /// The root sentinel.
    #[must_use]
    pub const fn root(&self) -> AccountId {
        AccountId(0)
    }

    /// Add an account under `parent`, or directly under the root.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this book.
    pub fn add_account(&mut self, name: impl Into<String>, parent: Option<AccountId>) -> AccountId {
        let name = name.into();
        let parent = parent.unwrap_or_else(|| self.root());
        assert!(parent.0 < self.accounts.len(), "unknown parent {parent}");

        let full_name = if parent == self.root() {
            name.clone()
        } else {
            format!("{}{ACCOUNT_SEPARATOR}{name}", self.full_names[parent.0])
        };

        let id = AccountId(self.accounts.len());
        self.accounts.push(Account {
            name,
            parent: Some(parent),
        });
        self.full_names.push(full_name);
        id
    }

    /// Look up an account.
    #[must_use]
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(id.0)
    }

    /// All accounts, root first.
    pub fn accounts(&self) -> impl Iterator<Item = (AccountId, &Account)> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (AccountId(i), a))
    }

    /// Number of accounts, excluding the root sentinel.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len() - 1
    }

    /// Fully-qualified name: the colon-joined path from the top-level
    /// account down to `id`, without the root's own name.
    ///
    /// The root itself and unknown ids have an empty name.
    #[must_use]
    pub fn full_name(&self, id: AccountId) -> &str {
        self.full_names.get(id.0).map_or("", String::as_str)
    }

    /// Find an account by its fully-qualified name.
    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<AccountId> {
        self.full_names
            .iter()
            .skip(1)
            .position(|n| n == full_name)
            .map(|i| AccountId(i + 1))
    }

    /// Record a transaction.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// All transactions, in insertion order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME)
    }
}
