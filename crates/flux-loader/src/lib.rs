//! Ledger document loader.
//!
//! This crate reads a book (account tree plus transactions) from a JSON
//! document and builds a [`flux_core::Book`]. It is the only place that knows
//! about the on-disk ledger format; the engine works on the in-memory model.
//!
//! # Features
//!
//! - Accounts may be declared in any order; parents are resolved by id
//! - Duplicate ids, dangling references and parent cycles are rejected
//! - Split values accept JSON strings or numbers
//! - Gzip-compressed files are decompressed transparently
//!
//! # Example
//!
//! ```ignore
//! use flux_loader::Loader;
//! use std::path::Path;
//!
//! let book = Loader::new().load(Path::new("ledger.json"))?;
//! for txn in book.transactions() {
//!     println!("{} {}", txn.date, txn.currency);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod document;

pub use document::{AccountEntry, BookDocument, SplitEntry, TransactionEntry};

use flate2::read::GzDecoder;
use flux_core::Book;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// First two bytes of every gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the schema.
    #[error("invalid ledger document {path}: {source}")]
    Json {
        /// The offending file (`<memory>` for in-memory documents).
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Two accounts share an id.
    #[error("duplicate account id '{id}'")]
    DuplicateAccount {
        /// The repeated id.
        id: String,
    },

    /// An account names a parent that is not declared.
    #[error("account '{account}' has unknown parent '{parent}'")]
    UnknownParent {
        /// The child account id.
        account: String,
        /// The missing parent id.
        parent: String,
    },

    /// The parent chain of an account loops back on itself.
    #[error("account '{account}' is its own ancestor")]
    ParentCycle {
        /// An account on the cycle.
        account: String,
    },

    /// A split references an account that is not declared.
    #[error("split references unknown account '{id}'")]
    UnknownAccount {
        /// The missing account id.
        id: String,
    },
}

/// Ledger document loader.
#[derive(Debug, Default)]
pub struct Loader {
    /// Overrides the document's root sentinel name.
    root_name: Option<String>,
}

impl Loader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the name of the root sentinel declared in the document.
    #[must_use]
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    /// Load a ledger file, decompressing it first if it is gzipped.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`] - the file cannot be read or decompressed
    /// - [`LoadError::Json`] - the content is not a valid document
    /// - any structural error from [`BookDocument::into_book`]
    pub fn load(&self, path: &Path) -> Result<Book, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let bytes = fs::read(path).map_err(io_err)?;

        let text = if bytes.starts_with(&GZIP_MAGIC) {
            debug!(path = %path.display(), "decompressing gzip ledger");
            let mut text = String::new();
            GzDecoder::new(bytes.as_slice())
                .read_to_string(&mut text)
                .map_err(io_err)?;
            text
        } else {
            String::from_utf8(bytes).map_err(|e| {
                io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?
        };

        self.parse(&text, path)
    }

    /// Load a ledger from an in-memory JSON document.
    pub fn load_str(&self, text: &str) -> Result<Book, LoadError> {
        self.parse(text, Path::new("<memory>"))
    }

    fn parse(&self, text: &str, path: &Path) -> Result<Book, LoadError> {
        let mut document: BookDocument =
            serde_json::from_str(text).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(root) = &self.root_name {
            document.root.clone_from(root);
        }

        let book = document.into_book()?;
        info!(
            path = %path.display(),
            accounts = book.account_count(),
            transactions = book.transactions().len(),
            "loaded ledger"
        );
        Ok(book)
    }
}

/// Load a ledger file.
///
/// This is a convenience function that creates a loader and loads a single file.
pub fn load(path: &Path) -> Result<Book, LoadError> {
    Loader::new().load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SMALL: &str = r#"{
        "root": "Top",
        "accounts": [ { "id": "a", "name": "Assets" } ]
    }"#;

    #[test]
    fn test_load_plain_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();
        file.flush().unwrap();

        let book = load(file.path()).unwrap();
        assert_eq!(book.account_count(), 1);
        assert_eq!(book.account(book.root()).unwrap().name, "Top");
    }

    #[test]
    fn test_load_gzip_file() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SMALL.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut file = NamedTempFile::with_suffix(".json.gz").unwrap();
        file.write_all(&compressed).unwrap();
        file.flush().unwrap();

        let book = load(file.path()).unwrap();
        assert!(book.find("Assets").is_some());
    }

    #[test]
    fn test_root_name_override() {
        let book = Loader::new().with_root_name("Root").load_str(SMALL).unwrap();
        assert_eq!(book.account(book.root()).unwrap().name, "Root");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load(Path::new("/nonexistent/ledger.json"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        let result = Loader::new().load_str("{ not json");
        match result {
            Err(LoadError::Json { path, .. }) => assert_eq!(path, Path::new("<memory>")),
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = Loader::new().load_str(r#"{ "acounts": [] }"#);
        assert!(matches!(result, Err(LoadError::Json { .. })));
    }
}
