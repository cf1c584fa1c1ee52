//! Document store: cached reads and write-through writes over a key-value medium.
//!
//! # Responsibility
//! - Own the in-memory document cache for one process.
//! - Serialize documents to JSON text before they touch the medium.
//! - Degrade storage and parse failures to fallbacks instead of errors.
//!
//! # Invariants
//! - A failed write never changes the cache.
//! - Reads never write to the medium.
//! - Keys are namespaced before they reach the medium.

mod document_store;
mod medium;
mod sqlite_medium;

pub use document_store::{DocumentStore, StoreConfig, Updater, DEFAULT_NAMESPACE};
pub use medium::{MediumError, MediumResult, MemoryMedium, StorageMedium};
pub use sqlite_medium::SqliteMedium;

/// Any JSON value stored under one key.
pub type Document = serde_json::Value;

/// Returns whether `key` may be used as a store key.
///
/// Any non-empty string is accepted; the medium stores keys verbatim.
pub fn is_valid_store_key(key: &str) -> bool {
    !key.is_empty()
}
