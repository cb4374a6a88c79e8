//! Cash-flow report tool.
//!
//! The `flux` binary reads a ledger document and a list of asset account
//! prefixes and writes a spreadsheet-ready CSV of money flowing in and out
//! of those assets, one column per closed month.
//!
//! # Example Usage
//!
//! ```bash
//! flux ledger.json
//! flux --assets my-assets.txt --layout plain -o - ledger.json.gz
//! flux --rate USD=5.40 --today 2024-01-15 ledger.json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
