//! SQLite bootstrap for the movie ledger.
//!
//! # Responsibility
//! - Open file-backed or in-memory ledger connections.
//! - Report which stage of reaching the ledger failed.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while reaching or using the ledger database.
#[derive(Debug)]
pub enum DbError {
    /// The database file could not be opened at all.
    Open(rusqlite::Error),
    /// Pragmas or schema creation failed on a freshly opened connection.
    Bootstrap(rusqlite::Error),
    /// A ledger statement failed after bootstrap.
    Query(rusqlite::Error),
    /// The file was written by a newer build.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl DbError {
    /// Short stage label used in log events and messages.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Open(_) => "open",
            Self::Bootstrap(_) | Self::UnsupportedSchemaVersion { .. } => "bootstrap",
            Self::Query(_) => "query",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "cannot open ledger: {err}"),
            Self::Bootstrap(err) => write!(f, "cannot prepare ledger: {err}"),
            Self::Query(err) => write!(f, "ledger statement failed: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "ledger schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Bootstrap(err) | Self::Query(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}
