//! Record shapes for every domain collection.
//!
//! # Responsibility
//! - Give each collection an explicit, typed record shape.
//! - Keep JSON field names compatible with stored camelCase documents.
//!
//! # Invariants
//! - Fields missing from stored JSON, or stored as `null`, take their
//!   `Default`.
//! - Status and priority values this build does not know are kept verbatim
//!   in an `Other` variant and written back unchanged.
//! - Foreign keys (`client_id`, `template_id`) are references by convention
//!   only; nothing cascades on delete.

use crate::model::ids::{impl_record, RecordId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// Reads a JSON `null` as the field's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Division partition key for agency-wide collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    Gm,
    Sg,
}

impl Division {
    pub const ALL: [Division; 2] = [Division::Gm, Division::Sg];

    /// Partition key used inside partitioned documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gm => "gm",
            Self::Sg => "sg",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gm" => Some(Self::Gm),
            "sg" => Some(Self::Sg),
            _ => None,
        }
    }
}

/// In-house or contractor membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Inhouse,
    Contractor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMember {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "null_as_default")]
    pub kind: MemberKind,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Team roster split by membership kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamDirectory {
    #[serde(deserialize_with = "null_as_default")]
    pub inhouse: Vec<TeamMember>,
    #[serde(deserialize_with = "null_as_default")]
    pub contractors: Vec<TeamMember>,
}

impl TeamDirectory {
    pub fn len(&self) -> usize {
        self.inhouse.len() + self.contractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inhouse.is_empty() && self.contractors.is_empty()
    }

    pub fn find_by_email(&self, email: &str) -> Option<&TeamMember> {
        self.inhouse
            .iter()
            .chain(self.contractors.iter())
            .find(|member| member.email.eq_ignore_ascii_case(email))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub account_manager: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingMaterial {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    pub url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

/// When a job runs: on a repeating cadence or once by a due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum JobSchedule {
    Recurring { frequency: Frequency },
    OneTime { due_date: String },
}

impl Default for JobSchedule {
    fn default() -> Self {
        Self::Recurring {
            frequency: Frequency::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    InProgress,
    NeedsAssistance,
    Done,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub client_id: Option<RecordId>,
    pub template_id: Option<RecordId>,
    pub assignee: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub schedule: JobSchedule,
    #[serde(deserialize_with = "null_as_default")]
    pub status: JobStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    /// Written by another client; treated as open.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub assignee: Option<String>,
    pub client_id: Option<RecordId>,
    /// Calendar date `YYYY-MM-DD`.
    pub due_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    pub completed_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyPriority {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub done: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DigitalAsset {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub asset_type: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub source_template_id: Option<RecordId>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credential {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub service: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    pub password: Option<String>,
    pub url: Option<String>,
    pub source_template_id: Option<RecordId>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

// Secrets stay out of debug output and therefore out of logs.
impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("url", &self.url)
            .field("source_template_id", &self.source_template_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientNote {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingTranscription {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Calendar date `YYYY-MM-DD`.
    #[serde(deserialize_with = "null_as_default")]
    pub meeting_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub transcript: String,
    pub summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Activation state of one named service for one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceActivation {
    #[serde(deserialize_with = "null_as_default")]
    pub active: bool,
    pub activated_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetAllocation {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub channel: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: f64,
    /// Budget period label, e.g. `2024-05`.
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValueEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    pub source_template_id: Option<RecordId>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl_record!(
    TeamMember,
    Client,
    TrainingMaterial,
    Job,
    Task,
    DailyPriority,
    Contact,
    DigitalAsset,
    Credential,
    ClientNote,
    MeetingTranscription,
    BudgetAllocation,
    KeyValueEntry,
);

/// Partition key → records.
pub type Partitioned<R> = BTreeMap<String, Vec<R>>;

/// Client id → service name → activation.
pub type ClientServiceMap = BTreeMap<String, BTreeMap<String, ServiceActivation>>;
