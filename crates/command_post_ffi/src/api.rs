//! FFI use-case API for the UI shell.
//!
//! # Responsibility
//! - Expose the process document store and a few use-cases as sync calls.
//! - Translate JSON text in and out at the boundary.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - One store per process, guarded by a mutex; opened explicitly or lazily
//!   at the resolved default path on first use.
//! - Failures surface as `ok=false` envelopes or non-empty message strings.

use command_post_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, initialize_team,
    ping as ping_inner, DocumentStore, FileSeedSource, FormValues, RecordId, SqliteMedium,
    TemplateService,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const STORE_DB_FILE_NAME: &str = "command_post.sqlite3";
const DB_PATH_ENV: &str = "COMMAND_POST_DB_PATH";

static STORE: OnceLock<Mutex<Option<OpenStore>>> = OnceLock::new();

struct OpenStore {
    path: PathBuf,
    store: DocumentStore<SqliteMedium>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Repeating the same `level + log_dir` is a no-op; switching is rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic result envelope for store calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResponse {
    /// Whether the call did what was asked.
    pub ok: bool,
    /// JSON text of the returned document, when the call returns one.
    pub value_json: Option<String>,
    /// Human-readable diagnostics; empty on plain success.
    pub message: String,
}

impl StoreResponse {
    fn done() -> Self {
        Self {
            ok: true,
            value_json: None,
            message: String::new(),
        }
    }

    fn value(value_json: String) -> Self {
        Self {
            ok: true,
            value_json: Some(value_json),
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value_json: None,
            message: message.into(),
        }
    }
}

/// Opens (or reopens) the process store on `db_path`.
///
/// `None` or a blank path resolves to `COMMAND_POST_DB_PATH`, then to the
/// temp directory. Reopening drops the previous store's cache.
#[flutter_rust_bridge::frb(sync)]
pub fn store_open(db_path: Option<String>) -> StoreResponse {
    let path = resolve_db_path(db_path.as_deref());
    match open_store(path) {
        Ok(open) => {
            let message = open.path.display().to_string();
            *lock_store() = Some(open);
            StoreResponse {
                ok: true,
                value_json: None,
                message,
            }
        }
        Err(err) => StoreResponse::failure(err),
    }
}

/// Reads `key`, returning `fallback_json` when absent or unreadable.
///
/// `ok=false` only when `fallback_json` is not valid JSON or no store can
/// be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn store_get(key: String, fallback_json: String) -> StoreResponse {
    let fallback = match serde_json::from_str(&fallback_json) {
        Ok(value) => value,
        Err(err) => return StoreResponse::failure(format!("store_get: invalid fallback json: {err}")),
    };
    match with_store(|store| store.get(&key, fallback).to_string()) {
        Ok(value_json) => StoreResponse::value(value_json),
        Err(err) => StoreResponse::failure(err),
    }
}

/// Writes `value_json` under `key` through to disk.
#[flutter_rust_bridge::frb(sync)]
pub fn store_set(key: String, value_json: String) -> StoreResponse {
    let value = match serde_json::from_str(&value_json) {
        Ok(value) => value,
        Err(err) => return StoreResponse::failure(format!("store_set: invalid value json: {err}")),
    };
    match with_store(|store| store.set(&key, value)) {
        Ok(true) => StoreResponse::done(),
        Ok(false) => StoreResponse::failure(format!("store_set: write rejected for `{key}`")),
        Err(err) => StoreResponse::failure(err),
    }
}

/// Removes `key`; missing keys succeed.
#[flutter_rust_bridge::frb(sync)]
pub fn store_clear(key: String) -> StoreResponse {
    match with_store(|store| store.clear(&key)) {
        Ok(()) => StoreResponse::done(),
        Err(err) => StoreResponse::failure(err),
    }
}

/// Team roster sizes after initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamResponse {
    pub ok: bool,
    pub inhouse: u32,
    pub contractors: u32,
    pub message: String,
}

/// Returns the stored roster, seeding it from `seed_path` when absent.
///
/// An unreadable seed falls back to the built-in roster and still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn team_initialize(seed_path: String) -> TeamResponse {
    let source = FileSeedSource::at(seed_path.trim());
    match with_store(|store| initialize_team(store, &source)) {
        Ok(team) => TeamResponse {
            ok: true,
            inhouse: count(team.inhouse.len()),
            contractors: count(team.contractors.len()),
            message: String::new(),
        },
        Err(err) => TeamResponse {
            ok: false,
            inhouse: 0,
            contractors: 0,
            message: err,
        },
    }
}

/// Outcome counts of one template run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRunResponse {
    /// False when the template is unknown, inputs are malformed, or any
    /// action write failed.
    pub ok: bool,
    pub applied: u32,
    pub skipped: u32,
    pub ignored: u32,
    pub failed: u32,
    pub message: String,
}

impl TemplateRunResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: 0,
            skipped: 0,
            ignored: 0,
            failed: 0,
            message: message.into(),
        }
    }
}

/// Runs a task template's completion actions for `client_id`.
///
/// `fields_json` is a flat JSON object of form field values. Actions are
/// applied one by one; a failed write leaves earlier actions in place.
#[flutter_rust_bridge::frb(sync)]
pub fn task_template_run(
    template_id: String,
    client_id: String,
    fields_json: String,
) -> TemplateRunResponse {
    let form: FormValues = match serde_json::from_str(&fields_json) {
        Ok(form) => form,
        Err(err) => {
            return TemplateRunResponse::failure(format!(
                "task_template_run: fields must be a flat JSON object of strings: {err}"
            ))
        }
    };
    let client_id = client_id.trim().to_string();
    if client_id.is_empty() {
        return TemplateRunResponse::failure("task_template_run: client_id is empty");
    }
    let template_id = RecordId::parse(template_id.trim());

    let result = with_store(|store| {
        TemplateService::new(store)
            .run(&template_id, &client_id, &form)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(Ok(report)) => TemplateRunResponse {
            ok: report.failed() == 0,
            applied: count(report.applied()),
            skipped: count(report.skipped()),
            ignored: count(report.ignored()),
            failed: count(report.failed()),
            message: if report.is_partial() {
                "partially applied".to_string()
            } else {
                String::new()
            },
        },
        Ok(Err(err)) | Err(err) => TemplateRunResponse::failure(err),
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn resolve_db_path(explicit: Option<&str>) -> PathBuf {
    let explicit = explicit.map(str::trim).filter(|path| !path.is_empty());
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(STORE_DB_FILE_NAME)
}

fn open_store(path: PathBuf) -> Result<OpenStore, String> {
    match SqliteMedium::open(&path) {
        Ok(medium) => {
            info!(
                "event=store_open module=ffi status=ok path={}",
                path.display()
            );
            Ok(OpenStore {
                path,
                store: DocumentStore::new(medium),
            })
        }
        Err(err) => {
            warn!(
                "event=store_open module=ffi status=error path={} error={err}",
                path.display()
            );
            Err(format!("store open failed at `{}`: {err}", path.display()))
        }
    }
}

fn lock_store() -> std::sync::MutexGuard<'static, Option<OpenStore>> {
    STORE
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn with_store<T>(f: impl FnOnce(&mut DocumentStore<SqliteMedium>) -> T) -> Result<T, String> {
    let mut guard = lock_store();
    if guard.is_none() {
        *guard = Some(open_store(resolve_db_path(None))?);
    }
    match guard.as_mut() {
        Some(open) => Ok(f(&mut open.store)),
        None => Err("store is not open".to_string()),
    }
}
