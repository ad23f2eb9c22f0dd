//! Domain model for the movie queue.
//!
//! # Responsibility
//! - Define the records shared by the ledger and the category store.
//!
//! # Invariants
//! - Every item is identified by a ledger-assigned `ItemId` that is never reused.
//! - An item's `category` always names the bucket it lives in.

pub mod item;
