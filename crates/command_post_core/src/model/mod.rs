//! Typed domain model for the command post collections.
//!
//! # Responsibility
//! - Define one explicit document type per named collection.
//! - Define template actions and their field-mapping checks.
//!
//! # Invariants
//! - Records are identified by `RecordId`, unique within one collection.
//! - `createdAt`/`updatedAt` are set by callers at mutation time, never by
//!   the store.

pub mod collections;
pub mod ids;
pub mod records;
pub mod settings;
pub mod template;
