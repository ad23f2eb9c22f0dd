//! Item ledger contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable insert/delete/scan APIs over the `movies` table.
//! - Keep a durable registry of user-created categories.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate input before any SQL mutation.
//! - Every write is a single statement, so it applies fully or not at all.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Ids come from `AUTOINCREMENT` and are never reused, even after deletes.

use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::model::item::{
    validate_category_name, validate_new_item, Item, ItemId, ItemValidationError,
};
use log::{debug, error};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const ITEM_SELECT_SQL: &str = "SELECT id, category, title FROM movies";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for ledger persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}

/// Durable storage of items, queryable by category.
pub trait ItemLedger {
    /// Returns every stored record exactly once, in id order.
    fn load_all(&self) -> RepoResult<Vec<Item>>;
    /// Returns the records of one category through the category index.
    fn load_category(&self, category: &str) -> RepoResult<Vec<Item>>;
    /// Appends one record and returns the engine-assigned id.
    fn insert(&self, category: &str, title: &str) -> RepoResult<ItemId>;
    /// Appends one record and durably records its category, atomically.
    fn insert_recording_category(&self, category: &str, title: &str) -> RepoResult<ItemId>;
    /// Removes exactly one record. Missing ids are `RepoError::NotFound`.
    fn delete_by_id(&self, id: ItemId) -> RepoResult<()>;
    /// Durably records a category name. Recording an existing name is a no-op.
    fn record_category(&self, name: &str) -> RepoResult<()>;
    /// Returns recorded category names sorted by name.
    fn list_categories(&self) -> RepoResult<Vec<String>>;
    /// Ends the ledger lifecycle.
    fn close(self) -> RepoResult<()>
    where
        Self: Sized;
}

/// SQLite-backed ledger owning its connection.
pub struct SqliteItemLedger {
    conn: Connection,
}

impl SqliteItemLedger {
    /// Opens (or creates) a ledger file with the schema applied.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens an in-memory ledger; contents vanish on close.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps a connection that was opened through `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn query_items(&self, sql: &str, bind: &[&dyn rusqlite::ToSql]) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }
}

impl ItemLedger for SqliteItemLedger {
    fn load_all(&self) -> RepoResult<Vec<Item>> {
        let items = self.query_items(&format!("{ITEM_SELECT_SQL} ORDER BY id ASC;"), &[])?;
        debug!(
            "event=ledger_load module=ledger status=ok rows={}",
            items.len()
        );
        Ok(items)
    }

    fn load_category(&self, category: &str) -> RepoResult<Vec<Item>> {
        self.query_items(
            &format!("{ITEM_SELECT_SQL} INDEXED BY idx_movies_category WHERE category = ?1 ORDER BY id ASC;"),
            &[&category],
        )
    }

    fn insert(&self, category: &str, title: &str) -> RepoResult<ItemId> {
        validate_new_item(category, title)?;

        if let Err(err) = self.conn.execute(
            "INSERT INTO movies (category, title) VALUES (?1, ?2);",
            params![category, title],
        ) {
            error!("event=ledger_insert module=ledger status=error error={err}");
            return Err(err.into());
        }

        let id = self.conn.last_insert_rowid();
        debug!("event=ledger_insert module=ledger status=ok id={id}");
        Ok(id)
    }

    fn insert_recording_category(&self, category: &str, title: &str) -> RepoResult<ItemId> {
        validate_new_item(category, title)?;

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let id = match insert_in_category(&tx, category, title) {
            Ok(id) => id,
            Err(err) => {
                error!("event=ledger_insert module=ledger status=error new_category=true error={err}");
                return Err(err.into());
            }
        };
        tx.commit()?;

        debug!("event=ledger_insert module=ledger status=ok new_category=true id={id}");
        Ok(id)
    }

    fn delete_by_id(&self, id: ItemId) -> RepoResult<()> {
        let changed = match self
            .conn
            .execute("DELETE FROM movies WHERE id = ?1;", [id])
        {
            Ok(changed) => changed,
            Err(err) => {
                error!("event=ledger_delete module=ledger status=error id={id} error={err}");
                return Err(err.into());
            }
        };

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=ledger_delete module=ledger status=ok id={id}");
        Ok(())
    }

    fn record_category(&self, name: &str) -> RepoResult<()> {
        validate_category_name(name)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?1);",
            [name],
        )?;
        Ok(())
    }

    fn list_categories(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM categories ORDER BY name ASC;")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        for name in &names {
            validate_category_name(name).map_err(|_| {
                RepoError::InvalidData("blank value in categories.name".to_string())
            })?;
        }

        Ok(names)
    }

    fn close(self) -> RepoResult<()> {
        self.conn.close().map_err(|(_, err)| {
            error!("event=ledger_close module=ledger status=error error={err}");
            RepoError::from(err)
        })
    }
}

// Dropping `tx` on error rolls back the item row as well.
fn insert_in_category(
    tx: &Transaction<'_>,
    category: &str,
    title: &str,
) -> rusqlite::Result<ItemId> {
    tx.execute(
        "INSERT INTO movies (category, title) VALUES (?1, ?2);",
        params![category, title],
    )?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "INSERT OR IGNORE INTO categories (name) VALUES (?1);",
        [category],
    )?;
    Ok(id)
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let item = Item {
        id: row.get("id")?,
        category: row.get("category")?,
        title: row.get("title")?,
    };
    item.validate().map_err(|err| {
        RepoError::InvalidData(format!("row {} in movies: {err}", item.id))
    })?;
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::{ItemLedger, RepoError, SqliteItemLedger};
    use crate::model::item::ItemValidationError;

    #[test]
    fn insert_rejects_blank_title_before_writing() {
        let ledger = SqliteItemLedger::open_in_memory().unwrap();

        let err = ledger.insert("drama", "  ").unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ItemValidationError::BlankTitle)
        ));
        assert!(ledger.load_all().unwrap().is_empty());
    }

    #[test]
    fn corrupt_row_is_reported_not_masked() {
        let ledger = SqliteItemLedger::open_in_memory().unwrap();
        ledger
            .connection()
            .execute(
                "INSERT INTO movies (category, title) VALUES ('drama', '');",
                [],
            )
            .unwrap();

        let err = ledger.load_all().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn record_category_is_idempotent() {
        let ledger = SqliteItemLedger::open_in_memory().unwrap();
        ledger.record_category("Horror").unwrap();
        ledger.record_category("Horror").unwrap();
        ledger.record_category("Anime").unwrap();

        assert_eq!(ledger.list_categories().unwrap(), vec!["Anime", "Horror"]);
    }
}
