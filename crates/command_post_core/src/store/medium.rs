//! Persistent medium contract and the in-process implementation.

use crate::db::DbError;
use std::collections::BTreeMap;
use thiserror::Error;

pub type MediumResult<T> = Result<T, MediumError>;

/// Failure reported by a persistent medium.
#[derive(Debug, Error)]
pub enum MediumError {
    /// The write would push the medium past its byte quota.
    #[error("quota exceeded writing `{key}`: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
    /// The medium cannot be reached at all.
    #[error("storage medium unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for MediumError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed persistent dictionary the document store writes through to.
///
/// Keys passed here are already namespaced. Values are JSON text.
pub trait StorageMedium {
    /// Returns the stored text for `key`, or `None` when absent.
    fn read(&self, key: &str) -> MediumResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> MediumResult<()>;
    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> MediumResult<()>;
}

/// In-process medium with an optional byte quota.
///
/// Usage is counted as the sum of key and value lengths, the way browser
/// storage accounts for its quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by all entries.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw stored text, bypassing any cache. Useful for inspecting layout.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl StorageMedium for MemoryMedium {
    fn read(&self, key: &str) -> MediumResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> MediumResult<()> {
        if let Some(limit) = self.quota_bytes {
            let replaced = self
                .entries
                .get(key)
                .map_or(0, |previous| key.len() + previous.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > limit {
                return Err(MediumError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> MediumResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
