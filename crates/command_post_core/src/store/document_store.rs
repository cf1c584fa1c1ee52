//! Cached document store over a [`StorageMedium`].
//!
//! # Responsibility
//! - Serve reads from the cache first, then from the medium.
//! - Write through to the medium before updating the cache.
//! - Convert typed documents at the boundary via serde.
//!
//! # Invariants
//! - `get` never writes to the medium, even on fallback.
//! - `set` changes the cache only after the medium accepted the write.
//! - No operation returns an error for storage or parse failures; they are
//!   logged and degrade to fallback / `false` / no-op.
//! - Returned documents are owned copies; callers hand them back via `set`.

use super::medium::StorageMedium;
use super::{is_valid_store_key, Document};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Namespace prepended to every key before it reaches the medium.
pub const DEFAULT_NAMESPACE: &str = "goh_";

/// Store construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Prefix applied to keys in the medium. May be empty.
    pub namespace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

/// Next-value source for [`DocumentStore::update`].
///
/// The closure form may borrow from the caller's stack for `'a`.
pub enum Updater<'a> {
    /// Store this document regardless of the current one.
    Replace(Document),
    /// Derive the next document from the current one (`None` when absent).
    Apply(Box<dyn FnOnce(Option<Document>) -> Document + 'a>),
}

impl<'a> Updater<'a> {
    pub fn apply(f: impl FnOnce(Option<Document>) -> Document + 'a) -> Self {
        Self::Apply(Box::new(f))
    }

    fn next(self, current: Option<Document>) -> Document {
        match self {
            Self::Replace(value) => value,
            Self::Apply(f) => f(current),
        }
    }
}

impl From<Document> for Updater<'_> {
    fn from(value: Document) -> Self {
        Self::Replace(value)
    }
}

/// Process-wide document cache with write-through persistence.
///
/// Construct once at startup and pass `&mut` to every collection accessor.
pub struct DocumentStore<M: StorageMedium> {
    medium: M,
    namespace: String,
    cache: HashMap<String, Document>,
}

impl<M: StorageMedium> DocumentStore<M> {
    /// Creates a store with the default `goh_` namespace.
    pub fn new(medium: M) -> Self {
        Self::with_config(medium, StoreConfig::default())
    }

    /// Creates a store with explicit configuration.
    pub fn with_config(medium: M, config: StoreConfig) -> Self {
        Self {
            medium,
            namespace: config.namespace,
            cache: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub fn into_medium(self) -> M {
        self.medium
    }

    /// Keys currently held in the cache, sorted.
    pub fn cached_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Returns the document under `key`, or `fallback` when absent or unreadable.
    ///
    /// The fallback is returned as-is and is neither cached nor persisted.
    pub fn get(&mut self, key: &str, fallback: Document) -> Document {
        self.lookup(key).unwrap_or(fallback)
    }

    /// Returns whether a document exists under `key` without writing anything.
    pub fn contains(&mut self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Persists `value` under `key` and caches it.
    ///
    /// Returns `false` (cache untouched) when the key is empty, the value
    /// cannot be serialized, or the medium rejects the write.
    pub fn set(&mut self, key: &str, value: Document) -> bool {
        if !self.check_key(key, "store_set") {
            return false;
        }
        let raw = match serde_json::to_string(&value) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=store_set module=store status=error key={key} error_code=serialize_failed error={err}"
                );
                return false;
            }
        };
        if let Err(err) = self.medium.write(&self.storage_key(key), &raw) {
            error!(
                "event=store_set module=store status=error key={key} error_code=write_failed error={err}"
            );
            return false;
        }
        debug!(
            "event=store_set module=store status=ok key={key} bytes={}",
            raw.len()
        );
        self.cache.insert(key.to_string(), value);
        true
    }

    /// Read-modify-write of one key; returns what `set` returns.
    ///
    /// Not atomic across processes; the last writer wins.
    pub fn update<'a>(&mut self, key: &str, updater: impl Into<Updater<'a>>) -> bool {
        let current = self.lookup(key);
        let next = updater.into().next(current);
        self.set(key, next)
    }

    /// Closure form of [`DocumentStore::update`].
    pub fn update_with<'a>(
        &mut self,
        key: &str,
        f: impl FnOnce(Option<Document>) -> Document + 'a,
    ) -> bool {
        self.update(key, Updater::apply(f))
    }

    /// Removes `key` from the medium and the cache. Missing keys are a no-op.
    pub fn clear(&mut self, key: &str) {
        if !self.check_key(key, "store_clear") {
            return;
        }
        match self.medium.remove(&self.storage_key(key)) {
            Ok(()) => {
                self.cache.remove(key);
                debug!("event=store_clear module=store status=ok key={key}");
            }
            Err(err) => {
                warn!(
                    "event=store_clear module=store status=error key={key} error_code=remove_failed error={err}"
                );
            }
        }
    }

    /// Typed read: the document under `key` decoded as `T`, else `fallback`.
    ///
    /// A stored document that does not decode as `T` is logged and left in
    /// place; the caller receives the fallback.
    pub fn load<T: DeserializeOwned>(&mut self, key: &str, fallback: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=degraded key={key} error_code=shape_mismatch error={err}"
                );
                fallback
            }
        }
    }

    /// Typed read that reports a shape mismatch instead of hiding it.
    ///
    /// `Ok(None)` when nothing readable is stored. Write paths use this so a
    /// document they cannot decode is never saved over.
    ///
    /// # Errors
    /// The decode error when the stored document is not a `T`.
    pub fn try_load<T: DeserializeOwned>(
        &mut self,
        key: &str,
    ) -> Result<Option<T>, serde_json::Error> {
        self.lookup(key).map(serde_json::from_value).transpose()
    }

    /// Typed write: encodes `value` and stores it via `set`.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(document) => self.set(key, document),
            Err(err) => {
                error!(
                    "event=store_save module=store status=error key={key} error_code=serialize_failed error={err}"
                );
                false
            }
        }
    }

    /// Cache-aware read without fallback substitution.
    fn lookup(&mut self, key: &str) -> Option<Document> {
        if let Some(cached) = self.cache.get(key) {
            return Some(cached.clone());
        }
        if !self.check_key(key, "store_get") {
            return None;
        }

        let raw = match self.medium.read(&self.storage_key(key)) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(err) => {
                warn!(
                    "event=store_get module=store status=error key={key} error_code=read_failed error={err}"
                );
                return None;
            }
        };

        match serde_json::from_str::<Document>(&raw) {
            Ok(document) => {
                self.cache.insert(key.to_string(), document.clone());
                Some(document)
            }
            Err(err) => {
                warn!(
                    "event=store_get module=store status=error key={key} error_code=parse_failed error={err}"
                );
                None
            }
        }
    }

    fn check_key(&self, key: &str, event: &str) -> bool {
        if is_valid_store_key(key) {
            return true;
        }
        error!("event={event} module=store status=error error_code=empty_key");
        false
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }
}
