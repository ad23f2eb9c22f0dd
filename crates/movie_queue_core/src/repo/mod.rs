//! Ledger layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable item ledger contract.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Ledger APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod item_repo;
