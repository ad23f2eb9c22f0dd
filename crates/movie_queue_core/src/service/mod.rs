//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ledger calls into UI-facing operations.
//! - Keep UI layers decoupled from storage details.

pub mod category_store;
