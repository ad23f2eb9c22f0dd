//! Category store: in-memory category buckets reconciled with the ledger.
//!
//! # Responsibility
//! - Rebuild category state from the ledger once at startup.
//! - Apply add/pop/category operations persist-first, then in memory.
//! - Serve filtered read views to UI callers.
//!
//! # Invariants
//! - Every entry in a bucket was persisted under that bucket's name.
//! - Known categories ⊇ defaults ∪ recorded categories ∪ categories on items.
//! - A failed ledger write leaves in-memory state untouched.
//! - Category names are deduplicated case-insensitively on creation only.

use crate::config::StoreConfig;
use crate::db::DbError;
use crate::model::item::{
    category_fold_key, validate_category_name, validate_new_item, Item, ItemEntry,
    ItemValidationError,
};
use crate::repo::item_repo::{ItemLedger, RepoError, SqliteItemLedger};
use log::{error, info, warn};
use rand::Rng;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

/// Sentinel selector value meaning "every category".
pub const ALL_CATEGORIES: &str = "all";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by category store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The ledger could not be opened or loaded. Fatal to the session.
    StorageUnavailable(RepoError),
    /// An insert/delete/record write was aborted. State is unchanged.
    WriteFailed(RepoError),
    /// Input was rejected before any persistence attempt.
    Validation(ItemValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::WriteFailed(err) => write!(f, "write failed: {err}"),
            Self::Validation(err) => write!(f, "invalid input: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) | Self::WriteFailed(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ItemValidationError> for StoreError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(RepoError::Db(value))
    }
}

/// Read selector for `CategoryStore::filter_by_category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl CategoryFilter {
    /// Maps the `all` sentinel to `All`, anything else to `Only`.
    pub fn parse(selector: &str) -> Self {
        if selector == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Only(selector.to_string())
        }
    }
}

/// Owner of category → items state, synchronized with an `ItemLedger`.
pub struct CategoryStore<L: ItemLedger> {
    ledger: L,
    buckets: BTreeMap<String, Vec<ItemEntry>>,
}

impl CategoryStore<SqliteItemLedger> {
    /// Opens the SQLite ledger at `path` and initializes from it.
    pub fn open<I, S>(path: impl AsRef<Path>, default_categories: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ledger = SqliteItemLedger::open(path).map_err(log_open_failure)?;
        Self::initialize(ledger, default_categories)
    }

    /// Opens the ledger described by `config`.
    pub fn open_with_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(&config.db_path, config.default_categories.iter().cloned())
    }

    /// Same as `open`, backed by an in-memory ledger.
    pub fn open_in_memory<I, S>(default_categories: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ledger = SqliteItemLedger::open_in_memory().map_err(log_open_failure)?;
        Self::initialize(ledger, default_categories)
    }
}

impl<L: ItemLedger> CategoryStore<L> {
    /// Loads every record and recorded category, then unions with defaults.
    ///
    /// This is the only full reconciliation; afterwards state is kept
    /// consistent incrementally.
    pub fn initialize<I, S>(ledger: L, default_categories: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started_at = Instant::now();
        let mut buckets: BTreeMap<String, Vec<ItemEntry>> = default_categories
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();

        let recorded = ledger.list_categories().map_err(|err| {
            error!("event=store_init module=store status=error stage=categories error={err}");
            StoreError::StorageUnavailable(err)
        })?;
        for name in recorded {
            buckets.entry(name).or_default();
        }

        let items = ledger.load_all().map_err(|err| {
            error!("event=store_init module=store status=error stage=items error={err}");
            StoreError::StorageUnavailable(err)
        })?;
        let item_count = items.len();
        for item in items {
            let (category, entry) = item.into_entry();
            buckets.entry(category).or_default().push(entry);
        }

        info!(
            "event=store_init module=store status=ok categories={} items={} duration_ms={}",
            buckets.len(),
            item_count,
            started_at.elapsed().as_millis()
        );
        Ok(Self { ledger, buckets })
    }

    /// Persists a new item, then appends it to its category.
    ///
    /// The title is stored exactly as given; it only has to be non-blank.
    /// An unknown category is created on first use and recorded in the same
    /// ledger transaction as the item, so it outlives its items.
    pub fn add_item(&mut self, category: &str, title: &str) -> StoreResult<Item> {
        validate_new_item(category, title)?;

        let result = if self.buckets.contains_key(category) {
            self.ledger.insert(category, title)
        } else {
            self.ledger.insert_recording_category(category, title)
        };
        let id = result.map_err(|err| {
            warn!("event=item_add module=store status=error error={err}");
            StoreError::WriteFailed(err)
        })?;

        let entry = ItemEntry {
            id,
            title: title.to_string(),
        };
        self.buckets
            .entry(category.to_string())
            .or_default()
            .push(entry.clone());

        info!("event=item_add module=store status=ok id={id}");
        Ok(entry.into_item(category))
    }

    /// Pops a uniformly random item from `category` using the thread RNG.
    ///
    /// Returns `Ok(None)` when there is nothing to remove.
    pub fn remove_random_item(&mut self, category: &str) -> StoreResult<Option<Item>> {
        self.remove_random_item_with(category, &mut rand::thread_rng())
    }

    /// Pops a uniformly random item from `category` using `rng`.
    ///
    /// The ledger delete runs before the in-memory removal. A record that is
    /// already gone from the ledger is dropped from memory and still returned.
    pub fn remove_random_item_with<R: Rng + ?Sized>(
        &mut self,
        category: &str,
        rng: &mut R,
    ) -> StoreResult<Option<Item>> {
        let Some(bucket) = self.buckets.get_mut(category).filter(|b| !b.is_empty()) else {
            warn!("event=item_pop module=store status=empty");
            return Ok(None);
        };

        let index = rng.gen_range(0..bucket.len());
        let id = bucket[index].id;

        match self.ledger.delete_by_id(id) {
            Ok(()) => info!("event=item_pop module=store status=ok id={id}"),
            Err(RepoError::NotFound(_)) => {
                warn!("event=item_pop module=store status=stale id={id}");
            }
            Err(err) => {
                warn!("event=item_pop module=store status=error id={id} error={err}");
                return Err(StoreError::WriteFailed(err));
            }
        }

        let entry = bucket.remove(index);
        Ok(Some(entry.into_item(category)))
    }

    /// Registers a new, empty category.
    ///
    /// Returns `Ok(true)` when a category was created, `Ok(false)` when the
    /// trimmed name is empty or an existing category matches ignoring case.
    pub fn add_category(&mut self, name: &str) -> StoreResult<bool> {
        let trimmed = name.trim();
        if validate_category_name(trimmed).is_err() {
            return Ok(false);
        }

        let key = category_fold_key(trimmed);
        if self
            .buckets
            .keys()
            .any(|existing| category_fold_key(existing) == key)
        {
            return Ok(false);
        }

        self.ledger.record_category(trimmed).map_err(|err| {
            warn!("event=category_add module=store status=error error={err}");
            StoreError::WriteFailed(err)
        })?;

        self.buckets.insert(trimmed.to_string(), Vec::new());
        info!(
            "event=category_add module=store status=ok categories={}",
            self.buckets.len()
        );
        Ok(true)
    }

    /// Returns category → titles, for every category or a single one.
    ///
    /// `Only` with an unknown name yields that name with no titles.
    pub fn filter_by_category(&self, filter: &CategoryFilter) -> BTreeMap<String, Vec<String>> {
        match filter {
            CategoryFilter::All => self
                .buckets
                .iter()
                .map(|(name, entries)| (name.clone(), titles_of(entries)))
                .collect(),
            CategoryFilter::Only(name) => {
                let entries = self.buckets.get(name).map(Vec::as_slice).unwrap_or(&[]);
                BTreeMap::from([(name.clone(), titles_of(entries))])
            }
        }
    }

    /// Category names in display order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Entries of one category, `None` when the category is unknown.
    pub fn items(&self, category: &str) -> Option<&[ItemEntry]> {
        self.buckets.get(category).map(Vec::as_slice)
    }

    /// Total number of items across all categories.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the backing ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Ends the store lifecycle and closes the ledger.
    pub fn close(self) -> StoreResult<()> {
        self.ledger.close().map_err(StoreError::WriteFailed)
    }
}

fn titles_of(entries: &[ItemEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.title.clone()).collect()
}

fn log_open_failure(err: DbError) -> StoreError {
    error!("event=store_open module=store status=error error={err}");
    StoreError::from(err)
}
