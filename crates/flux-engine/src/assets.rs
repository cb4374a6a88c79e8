//! Asset account classification by name prefix.

use crate::error::FluxError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Ordered list of asset account name prefixes.
///
/// A fully-qualified account name is an asset when any prefix is a literal,
/// case-sensitive string prefix of it.
///
/// # Examples
///
/// ```
/// use flux_engine::AssetList;
///
/// let assets = AssetList::parse("Assets:Bank\n\n  Assets:Cash  \n");
/// assert_eq!(assets.len(), 2);
/// assert!(assets.is_asset("Assets:Bank:Checking"));
/// assert!(assets.is_asset("Assets:Cash"));
/// assert!(!assets.is_asset("Expenses:Food"));
/// assert!(!assets.is_asset("assets:bank"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetList {
    prefixes: Vec<String>,
}

impl AssetList {
    /// Build a list from prefixes, trimming each and skipping blank ones.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Parse one prefix per line.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Read the asset list file.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::Config`] when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, FluxError> {
        let text = fs::read_to_string(path).map_err(|source| FluxError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&text);
        debug!(path = %path.display(), prefixes = list.len(), "loaded asset list");
        Ok(list)
    }

    /// Whether `name` starts with any configured prefix.
    #[must_use]
    pub fn is_asset(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// The configured prefixes, in file order.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Number of prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no prefix is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_prefix_is_literal() {
        let assets = AssetList::new(["Assets:Bank"]);
        assert!(assets.is_asset("Assets:Bank"));
        assert!(assets.is_asset("Assets:Bank:Checking"));
        // No component-boundary semantics: a plain string prefix.
        assert!(assets.is_asset("Assets:Banking"));
        assert!(!assets.is_asset("Assets:Ban"));
        assert!(!assets.is_asset(" Assets:Bank"));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let assets = AssetList::default();
        assert!(assets.is_empty());
        assert!(!assets.is_asset("Assets"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Assets:Bank").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Liabilities:Card").unwrap();
        file.flush().unwrap();

        let assets = AssetList::load(file.path()).unwrap();
        assert_eq!(assets.prefixes(), ["Assets:Bank", "Liabilities:Card"]);
    }

    #[test]
    fn test_unreadable_file_is_config_error() {
        let err = AssetList::load(Path::new("/nonexistent/assets.txt")).unwrap_err();
        assert!(matches!(err, FluxError::Config { .. }));
    }
}
