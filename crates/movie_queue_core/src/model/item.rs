//! Item domain model.
//!
//! # Responsibility
//! - Define the persisted `Item` record and its in-memory `ItemEntry` copy.
//! - Validate user input before it reaches storage.
//!
//! # Invariants
//! - `id` is assigned by the ledger, strictly positive and stable for the
//!   item lifetime.
//! - `title` and `category` are never blank after trimming.
//! - Titles are stored exactly as entered; only blankness is checked.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ledger-assigned identifier (SQLite rowid).
pub type ItemId = i64;

/// Validation failures for item and category input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Title is empty or whitespace only.
    BlankTitle,
    /// Category name is empty or whitespace only.
    BlankCategory,
    /// Persisted id is not a valid ledger id.
    InvalidId(ItemId),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title cannot be blank"),
            Self::BlankCategory => write!(f, "category cannot be blank"),
            Self::InvalidId(id) => write!(f, "invalid item id `{id}`"),
        }
    }
}

impl Error for ItemValidationError {}

/// One persisted ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub category: String,
    pub title: String,
}

impl Item {
    /// Splits the record into its category and the denormalized entry.
    pub fn into_entry(self) -> (String, ItemEntry) {
        (
            self.category,
            ItemEntry {
                id: self.id,
                title: self.title,
            },
        )
    }

    /// Validates a record read back from storage.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id <= 0 {
            return Err(ItemValidationError::InvalidId(self.id));
        }
        validate_new_item(&self.category, &self.title)
    }
}

/// Denormalized `{id, title}` copy held per category by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub id: ItemId,
    pub title: String,
}

impl ItemEntry {
    /// Re-attaches the owning category.
    pub fn into_item(self, category: impl Into<String>) -> Item {
        Item {
            id: self.id,
            category: category.into(),
            title: self.title,
        }
    }
}

/// Checks input for a new ledger record.
pub fn validate_new_item(category: &str, title: &str) -> Result<(), ItemValidationError> {
    validate_category_name(category)?;
    if title.trim().is_empty() {
        return Err(ItemValidationError::BlankTitle);
    }
    Ok(())
}

/// Checks that a category name is not blank.
pub fn validate_category_name(name: &str) -> Result<(), ItemValidationError> {
    if name.trim().is_empty() {
        return Err(ItemValidationError::BlankCategory);
    }
    Ok(())
}

/// Case-insensitive key used to dedup category names on creation.
pub fn category_fold_key(name: &str) -> String {
    name.trim().to_lowercase()
}
