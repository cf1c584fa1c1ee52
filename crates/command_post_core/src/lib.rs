//! Core domain logic for the agency command post.
//!
//! A cached document store over a persistent key-value medium, the typed
//! collections kept in it, and the task-template action interpreter.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::collections::{Collection, ALL_COLLECTION_KEYS};
pub use model::ids::RecordId;
pub use model::records::{Division, TaskStatus, TeamDirectory};
pub use model::settings::Settings;
pub use model::template::{FormValues, TaskTemplate, TemplateAction};
pub use repo::collection_repo::{CollectionRepository, RepoError, RepoResult};
pub use service::client_service::{ClientRoster, ClientServiceError};
pub use service::settings_service::{ensure_default_settings, update_settings};
pub use service::task_service::{AgendaItem, NewTask, TaskService, TaskServiceError};
pub use service::team_seed::{initialize_team, FileSeedSource, SeedError, SeedSource};
pub use service::template_service::{
    ActionOutcome, TemplateError, TemplateRunReport, TemplateService,
};
pub use store::{
    Document, DocumentStore, MediumError, MemoryMedium, SqliteMedium, StorageMedium, StoreConfig,
    Updater,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
