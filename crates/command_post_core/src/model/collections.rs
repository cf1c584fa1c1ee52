//! Catalog of named collections and their document types.
//!
//! Each collection is a zero-sized marker binding a store key to one typed
//! document. Accessors go through `repo::collection_repo`.

use crate::model::records::{
    BudgetAllocation, Client, ClientNote, ClientServiceMap, Contact, Credential, DailyPriority,
    DigitalAsset, Job, KeyValueEntry, MeetingTranscription, Partitioned, Task, TeamDirectory,
    TrainingMaterial,
};
use crate::model::settings::Settings;
use crate::model::template::{JobTemplate, TaskTemplate};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A named top-level document in the store.
pub trait Collection {
    /// Store key (unprefixed).
    const KEY: &'static str;
    /// Typed document shape; `Default` is the empty collection.
    type Document: Serialize + DeserializeOwned + Default;
}

macro_rules! collections {
    ($($(#[$meta:meta])* $name:ident => $key:literal : $doc:ty;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl Collection for $name {
                const KEY: &'static str = $key;
                type Document = $doc;
            }
        )+

        /// Every collection key, in catalog order.
        pub const ALL_COLLECTION_KEYS: &[&str] = &[$($key),+];
    };
}

collections! {
    /// In-house and contractor roster.
    Team => "teamData": TeamDirectory;
    /// Clients by division.
    Clients => "clientsData": Partitioned<Client>;
    Training => "trainingData": Vec<TrainingMaterial>;
    /// Recurring and one-time jobs by division.
    Jobs => "jobsData": Partitioned<Job>;
    /// Tasks by division.
    Tasks => "tasksData": Partitioned<Task>;
    /// Priorities by calendar date.
    DailyPriorities => "dailyPriorities": Partitioned<DailyPriority>;
    Contacts => "contactsData": Partitioned<Contact>;
    DigitalAssets => "digitalAssets": Partitioned<DigitalAsset>;
    Credentials => "credentialsData": Partitioned<Credential>;
    Notes => "notesData": Partitioned<ClientNote>;
    MeetingTranscriptions => "meetingTranscriptions": Partitioned<MeetingTranscription>;
    ClientServices => "clientServices": ClientServiceMap;
    BudgetAllocations => "budgetAllocations": Partitioned<BudgetAllocation>;
    /// Free-form key-value facts by client.
    KeyValueIndex => "keyValueIndex": Partitioned<KeyValueEntry>;
    TaskTemplates => "taskTemplates": Vec<TaskTemplate>;
    JobTemplates => "jobTemplates": Vec<JobTemplate>;
    SettingsDoc => "settings": Settings;
}
