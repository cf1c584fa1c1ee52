//! Repository layer over the document store.
//!
//! # Responsibility
//! - Map typed collections onto store keys.
//! - Keep serialization details out of service orchestration.
//!
//! # Invariants
//! - Repositories never bypass the store's cache/write-through contract.

pub mod collection_repo;
