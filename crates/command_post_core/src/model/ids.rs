//! Record identity and timestamp helpers.
//!
//! # Invariants
//! - New ids are allocated as `max(existing integer ids) + 1`, starting at 1.
//! - Legacy string ids load and round-trip unchanged but never feed allocation.
//! - Timestamps are RFC 3339 strings in UTC.

use log::error;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const EPOCH_RFC3339: &str = "1970-01-01T00:00:00Z";

/// Record identifier, unique within one collection list.
///
/// Stored data may carry either numeric ids (counter or epoch-millisecond
/// style) or string ids; both deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(u64),
    Text(String),
}

impl RecordId {
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// Parses a caller-supplied id: digits become `Int`, anything else `Text`.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        trimmed
            .parse::<u64>()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Text(trimmed.to_string()))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Common accessors for list entries in a collection.
pub trait Record {
    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
    /// Sets `createdAt` (when empty) and `updatedAt` to `now`.
    fn touch(&mut self, now: &str);
}

/// Implements [`Record`] for structs with `id`, `created_at`, `updated_at`.
macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::model::ids::Record for $ty {
                fn id(&self) -> &$crate::model::ids::RecordId {
                    &self.id
                }

                fn set_id(&mut self, id: $crate::model::ids::RecordId) {
                    self.id = id;
                }

                fn touch(&mut self, now: &str) {
                    if self.created_at.is_empty() {
                        self.created_at = now.to_string();
                    }
                    self.updated_at = now.to_string();
                }
            }
        )+
    };
}

pub(crate) use impl_record;

/// Allocates the next id for a list: one past the largest integer id.
pub fn next_record_id<'a, R, I>(records: I) -> RecordId
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let max = records
        .into_iter()
        .filter_map(|record| record.id().as_int())
        .max()
        .unwrap_or(0);
    RecordId::Int(max.saturating_add(1))
}

/// Assigns a fresh id and timestamps to `record`, then appends it to `list`.
///
/// Returns the assigned id.
pub fn append_record<R: Record>(list: &mut Vec<R>, mut record: R, now: &str) -> RecordId {
    let id = next_record_id(list.iter());
    record.set_id(id.clone());
    record.touch(now);
    list.push(record);
    id
}

/// Current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

pub fn format_rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|err| {
        error!("event=timestamp_format module=model status=error error={err}");
        EPOCH_RFC3339.to_string()
    })
}
