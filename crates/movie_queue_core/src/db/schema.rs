//! Ledger schema: created once, never migrated.
//!
//! # Invariants
//! - `PRAGMA user_version` is 0 before creation and `SCHEMA_VERSION` after.
//! - A database stamped with a higher version is refused untouched.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the ledger tables on a blank database; no-op when already present.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(DbError::Bootstrap)?;

    match found {
        SCHEMA_VERSION => Ok(()),
        0 => create_schema(conn).map_err(DbError::Bootstrap),
        found => Err(DbError::UnsupportedSchemaVersion {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}

fn create_schema(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::{ensure_schema, SCHEMA_VERSION};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn ensuring_twice_keeps_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO movies (category, title) VALUES ('drama', 'Heat');",
            [],
        )
        .unwrap();

        ensure_schema(&mut conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM movies;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn newer_stamp_is_refused_without_creating_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();

        let err = ensure_schema(&mut conn).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedSchemaVersion { found: 2, supported: 1 }));
        assert_eq!(err.stage(), "bootstrap");
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }
}
