//! Store configuration defaults.
//!
//! # Responsibility
//! - Hold the constants shared by every store caller.
//! - Describe where a store lives and which categories always exist.

use std::path::{Path, PathBuf};

/// Categories that exist even when the ledger holds no items for them.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["action", "comedy", "drama"];

/// Ledger file name inside the application data directory.
pub const DB_FILE_NAME: &str = "movies.sqlite3";

/// Log directory name inside the application data directory.
pub const LOG_DIR_NAME: &str = "logs";

/// Where a store lives and how it is seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub default_categories: Vec<String>,
}

impl StoreConfig {
    /// Config for `db_path` seeded with `DEFAULT_CATEGORIES`.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            default_categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Config for the default ledger file inside `data_dir`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DB_FILE_NAME))
    }

    pub fn with_default_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DB_FILE_NAME};
    use std::path::Path;

    #[test]
    fn new_config_uses_builtin_categories() {
        let config = StoreConfig::new("/tmp/movies.db");
        assert_eq!(config.default_categories, ["action", "comedy", "drama"]);
    }

    #[test]
    fn data_dir_config_points_at_ledger_file() {
        let config = StoreConfig::in_data_dir(Path::new("/var/lib/mq"));
        assert_eq!(config.db_path, Path::new("/var/lib/mq").join(DB_FILE_NAME));
    }
}
