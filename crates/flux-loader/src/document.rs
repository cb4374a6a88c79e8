//! Serialized form of a book and its conversion into [`Book`].

use crate::LoadError;
use chrono::NaiveDate;
use flux_core::{AccountId, Book, Split, Transaction, DEFAULT_ROOT_NAME};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Top-level JSON document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookDocument {
    /// Name of the root sentinel.
    #[serde(default = "default_root")]
    pub root: String,
    /// Account declarations, in any order.
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
    /// Transactions, in ledger order.
    #[serde(default)]
    pub transactions: Vec<TransactionEntry>,
}

fn default_root() -> String {
    DEFAULT_ROOT_NAME.to_string()
}

/// One account declaration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountEntry {
    /// Document-local identifier.
    pub id: String,
    /// Short name.
    pub name: String,
    /// Identifier of the parent; top-level accounts omit it.
    #[serde(default)]
    pub parent: Option<String>,
}

/// One transaction.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionEntry {
    /// Posting date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Currency code of the split values.
    pub currency: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// The legs.
    #[serde(default)]
    pub splits: Vec<SplitEntry>,
}

/// One leg of a transaction.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitEntry {
    /// Identifier of the owning account.
    pub account: String,
    /// Signed value, as a string or a JSON number.
    pub value: Decimal,
    /// Optional memo.
    #[serde(default)]
    pub memo: Option<String>,
}

/// Resolves document identifiers into arena ids while building the tree.
struct AccountResolver<'a> {
    entries: &'a [AccountEntry],
    index: HashMap<&'a str, usize>,
    resolved: Vec<Option<AccountId>>,
    visiting: Vec<bool>,
}

impl<'a> AccountResolver<'a> {
    fn new(entries: &'a [AccountEntry]) -> Result<Self, LoadError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.id.as_str(), i).is_some() {
                return Err(LoadError::DuplicateAccount {
                    id: entry.id.clone(),
                });
            }
        }
        Ok(Self {
            entries,
            index,
            resolved: vec![None; entries.len()],
            visiting: vec![false; entries.len()],
        })
    }

    /// Insert entry `i` into `book`, inserting its ancestors first.
    fn insert(&mut self, i: usize, book: &mut Book) -> Result<AccountId, LoadError> {
        if let Some(id) = self.resolved[i] {
            return Ok(id);
        }
        let entry = &self.entries[i];
        if self.visiting[i] {
            return Err(LoadError::ParentCycle {
                account: entry.id.clone(),
            });
        }
        self.visiting[i] = true;

        let parent = match &entry.parent {
            None => None,
            Some(parent) => {
                let p = *self
                    .index
                    .get(parent.as_str())
                    .ok_or_else(|| LoadError::UnknownParent {
                        account: entry.id.clone(),
                        parent: parent.clone(),
                    })?;
                Some(self.insert(p, book)?)
            }
        };

        let id = book.add_account(entry.name.clone(), parent);
        self.visiting[i] = false;
        self.resolved[i] = Some(id);
        Ok(id)
    }

    fn lookup(&self, id: &str) -> Result<AccountId, LoadError> {
        self.index
            .get(id)
            .and_then(|&i| self.resolved[i])
            .ok_or_else(|| LoadError::UnknownAccount { id: id.to_string() })
    }
}

impl BookDocument {
    /// Build the in-memory book.
    pub fn into_book(self) -> Result<Book, LoadError> {
        let mut book = Book::new(self.root.clone());
        let mut resolver = AccountResolver::new(&self.accounts)?;
        for i in 0..self.accounts.len() {
            resolver.insert(i, &mut book)?;
        }

        for entry in self.transactions {
            let mut transaction = Transaction::new(entry.date, entry.currency);
            transaction.description = entry.description;
            for split in entry.splits {
                let account = resolver.lookup(&split.account)?;
                transaction.splits.push(Split {
                    account,
                    value: split.value,
                    memo: split.memo,
                });
            }
            book.add_transaction(transaction);
        }

        Ok(book)
    }
}
