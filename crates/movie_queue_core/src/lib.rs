//! Core logic for the movie queue.
//! This crate owns every invariant; UI layers only call into it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{StoreConfig, DB_FILE_NAME, DEFAULT_CATEGORIES, LOG_DIR_NAME};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{Item, ItemEntry, ItemId, ItemValidationError};
pub use repo::item_repo::{ItemLedger, RepoError, RepoResult, SqliteItemLedger};
pub use service::category_store::{
    CategoryFilter, CategoryStore, StoreError, StoreResult, ALL_CATEGORIES,
};
