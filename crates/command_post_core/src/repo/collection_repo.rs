//! Typed collection accessors over a borrowed [`DocumentStore`].
//!
//! # Responsibility
//! - Load and save whole collection documents by their typed shape.
//! - Offer the per-collection bulk save used after in-place edits.
//! - Provide partition helpers shared by services.
//!
//! # Invariants
//! - Every write replaces the whole collection document.
//! - Writes to different collections are independent; nothing spans two keys.
//! - Reads degrade to the empty document; read-modify-write paths refuse to
//!   save over a stored document they could not decode.

use crate::model::collections::Collection;
use crate::model::ids::{next_record_id, Record, RecordId};
use crate::model::records::Partitioned;
use crate::store::{DocumentStore, StorageMedium};
use log::warn;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Why a read-modify-write of one collection did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// The stored document does not decode as the collection's shape; it was
    /// left untouched.
    #[error("stored `{0}` does not match its expected shape; refusing to overwrite")]
    ShapeMismatch(&'static str),
    #[error("failed to persist `{0}`")]
    PersistFailed(&'static str),
}

impl RepoError {
    pub fn collection(&self) -> &'static str {
        match self {
            Self::ShapeMismatch(key) | Self::PersistFailed(key) => key,
        }
    }
}

/// Collection-level view of a store borrowed for one unit of work.
pub struct CollectionRepository<'s, M: StorageMedium> {
    store: &'s mut DocumentStore<M>,
}

impl<'s, M: StorageMedium> CollectionRepository<'s, M> {
    pub fn new(store: &'s mut DocumentStore<M>) -> Self {
        Self { store }
    }

    /// Current document for `C`, or the empty document when absent/unreadable.
    pub fn load<C: Collection>(&mut self) -> C::Document {
        self.store.load(C::KEY, C::Document::default())
    }

    /// Current document for `C` as the base of a write.
    ///
    /// Absent documents start empty. A stored document of the wrong shape is
    /// an error, so callers never replace data they could not read.
    pub fn load_for_write<C: Collection>(&mut self) -> RepoResult<C::Document> {
        match self.store.try_load::<C::Document>(C::KEY) {
            Ok(document) => Ok(document.unwrap_or_default()),
            Err(err) => {
                warn!(
                    "event=repo_write module=repo status=rejected collection={} error_code=shape_mismatch error={err}",
                    C::KEY
                );
                Err(RepoError::ShapeMismatch(C::KEY))
            }
        }
    }

    /// Returns whether `C` has ever been saved (and not cleared).
    pub fn exists<C: Collection>(&mut self) -> bool {
        self.store.contains(C::KEY)
    }

    /// Writes the whole document for `C`.
    pub fn save<C: Collection>(&mut self, document: &C::Document) -> bool {
        self.store.save(C::KEY, document)
    }

    /// [`save`](Self::save) with the failure as a [`RepoError`].
    pub fn persist<C: Collection>(&mut self, document: &C::Document) -> RepoResult<()> {
        if self.save::<C>(document) {
            Ok(())
        } else {
            Err(RepoError::PersistFailed(C::KEY))
        }
    }

    /// Loads `C` for writing, applies `f`, and saves the result.
    ///
    /// `f` does not run when the stored document cannot be decoded.
    pub fn modify<C: Collection, T>(
        &mut self,
        f: impl FnOnce(&mut C::Document) -> T,
    ) -> RepoResult<T> {
        let mut document = self.load_for_write::<C>()?;
        let output = f(&mut document);
        self.persist::<C>(&document)?;
        Ok(output)
    }

    /// Removes `C` from the store entirely.
    pub fn reset<C: Collection>(&mut self) {
        self.store.clear(C::KEY);
    }

    /// Appends `record` to partition `partition_key` of a partitioned collection.
    ///
    /// Ids are allocated across all partitions, so they stay unique within
    /// the collection.
    pub fn append<C, R>(&mut self, partition_key: &str, record: R, now: &str) -> RepoResult<RecordId>
    where
        C: Collection<Document = Partitioned<R>>,
        R: Record,
    {
        self.modify::<C, _>(|document| append_partitioned(document, partition_key, record, now))
    }

    /// Records in one partition, empty when the partition does not exist.
    pub fn partition<C, R>(&mut self, partition_key: &str) -> Vec<R>
    where
        C: Collection<Document = Partitioned<R>>,
    {
        self.load::<C>().remove(partition_key).unwrap_or_default()
    }
}

/// Assigns the next collection-wide id and timestamps, then appends to one partition.
pub fn append_partitioned<R: Record>(
    document: &mut Partitioned<R>,
    partition_key: &str,
    mut record: R,
    now: &str,
) -> RecordId {
    let id = next_record_id(document.values().flatten());
    record.set_id(id.clone());
    record.touch(now);
    document
        .entry(partition_key.to_string())
        .or_default()
        .push(record);
    id
}

/// Finds a record by id across every partition.
///
/// Returns the partition key and the index inside it.
pub fn locate_record<R: Record>(document: &Partitioned<R>, id: &RecordId) -> Option<(String, usize)> {
    document.iter().find_map(|(partition, records)| {
        records
            .iter()
            .position(|record| record.id() == id)
            .map(|index| (partition.clone(), index))
    })
}

#[cfg(test)]
mod tests {
    use super::{locate_record, CollectionRepository, RepoError};
    use crate::model::collections::{Notes, Training};
    use crate::model::ids::RecordId;
    use crate::model::records::{ClientNote, TrainingMaterial};
    use crate::store::{DocumentStore, MemoryMedium};
    use serde_json::json;

    #[test]
    fn append_allocates_ids_across_partitions() {
        let mut store = DocumentStore::new(MemoryMedium::new());
        let mut repo = CollectionRepository::new(&mut store);

        let first = repo.append::<Notes, _>("7", ClientNote::default(), "2024-01-01T00:00:00Z");
        let second = repo.append::<Notes, _>("7", ClientNote::default(), "2024-01-01T00:00:00Z");
        let other = repo.append::<Notes, _>("8", ClientNote::default(), "2024-01-01T00:00:00Z");

        assert_eq!(first, Ok(RecordId::Int(1)));
        assert_eq!(second, Ok(RecordId::Int(2)));
        assert_eq!(other, Ok(RecordId::Int(3)));

        let notes = repo.partition::<Notes, _>("7");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].created_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn modify_saves_flat_collection() {
        let mut store = DocumentStore::new(MemoryMedium::new());
        let mut repo = CollectionRepository::new(&mut store);
        assert!(!repo.exists::<Training>());

        let len = repo.modify::<Training, _>(|materials| {
            materials.push(TrainingMaterial {
                title: "Brand voice".to_string(),
                ..TrainingMaterial::default()
            });
            materials.len()
        });
        assert_eq!(len, Ok(1));
        assert!(repo.exists::<Training>());

        repo.reset::<Training>();
        assert!(repo.load::<Training>().is_empty());
    }

    #[test]
    fn locate_finds_partition_and_index() {
        let mut store = DocumentStore::new(MemoryMedium::new());
        let mut repo = CollectionRepository::new(&mut store);
        repo.append::<Notes, _>("a", ClientNote::default(), "t");
        repo.append::<Notes, _>("b", ClientNote::default(), "t");
        repo.append::<Notes, _>("b", ClientNote::default(), "t");

        let notes = repo.load::<Notes>();
        assert_eq!(
            locate_record(&notes, &RecordId::Int(3)),
            Some(("b".to_string(), 1))
        );
        assert_eq!(locate_record(&notes, &RecordId::Int(9)), None);
    }

    #[test]
    fn modify_refuses_to_overwrite_undecodable_document() {
        let mut store = DocumentStore::new(MemoryMedium::new());
        assert!(store.set("notesData", json!({ "7": "not a list" })));
        let mut repo = CollectionRepository::new(&mut store);

        let mut ran = false;
        let result = repo.modify::<Notes, _>(|_| ran = true);
        assert_eq!(result, Err(RepoError::ShapeMismatch("notesData")));
        assert!(!ran);
        assert_eq!(
            repo.append::<Notes, _>("7", ClientNote::default(), "t"),
            Err(RepoError::ShapeMismatch("notesData"))
        );
        assert_eq!(
            store.medium().raw("goh_notesData"),
            Some(r#"{"7":"not a list"}"#)
        );
    }
}
