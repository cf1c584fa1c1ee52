//! Task template use-case service and completion-action interpreter.
//!
//! # Responsibility
//! - Store and look up task templates.
//! - Run a template's `onComplete` actions against one client's collections.
//!
//! # Invariants
//! - Each applied action is exactly one independent collection write; a
//!   later failure never rolls back an earlier action.
//! - Every action gets an outcome in the run report, in template order.
//! - Unknown action kinds and actions with missing required fields write
//!   nothing.

use crate::model::collections::{
    ClientServices, Collection, Credentials, DigitalAssets, KeyValueIndex, TaskTemplates,
};
use crate::model::ids::{append_record, now_rfc3339, Record, RecordId};
use crate::model::records::{Credential, DigitalAsset, KeyValueEntry, Partitioned};
use crate::model::template::{
    ActionKind, FieldMapping, FormValues, MappingIssue, ResolvedFields, TaskTemplate,
    TemplateAction,
};
use crate::repo::collection_repo::{
    append_partitioned, CollectionRepository, RepoError, RepoResult,
};
use crate::store::{DocumentStore, StorageMedium};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static KV_KEY_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid kv key regex"));

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("task template not found: {0}")]
    NotFound(RecordId),
    #[error("template action #{index} ({kind}) is invalid: {}", join_issues(.issues))]
    InvalidMapping {
        index: usize,
        kind: ActionKind,
        issues: Vec<MappingIssue>,
    },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

fn join_issues(issues: &[MappingIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of one action within a template run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action wrote to `collection`.
    Applied {
        kind: ActionKind,
        collection: &'static str,
        record_id: Option<RecordId>,
    },
    /// Required inputs were absent or blank; nothing was written.
    Skipped {
        kind: ActionKind,
        missing: Vec<&'static str>,
    },
    /// Unknown action kind; nothing was written.
    Ignored,
    /// The target collection could not be decoded or the write was
    /// rejected; the stored document is unchanged.
    Failed { kind: ActionKind, error: RepoError },
}

/// Per-action outcomes of one template run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRunReport {
    pub template_id: RecordId,
    pub client_id: String,
    pub outcomes: Vec<ActionOutcome>,
}

impl TemplateRunReport {
    pub fn applied(&self) -> usize {
        self.count(|outcome| matches!(outcome, ActionOutcome::Applied { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, ActionOutcome::Skipped { .. }))
    }

    pub fn ignored(&self) -> usize {
        self.count(|outcome| matches!(outcome, ActionOutcome::Ignored))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, ActionOutcome::Failed { .. }))
    }

    /// True when some actions were written and at least one write failed.
    ///
    /// Collections are left in whatever mixed state the run produced.
    pub fn is_partial(&self) -> bool {
        self.applied() > 0 && self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&ActionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| predicate(outcome)).count()
    }
}

/// Use-case service for task templates.
pub struct TemplateService<'s, M: StorageMedium> {
    repo: CollectionRepository<'s, M>,
}

impl<'s, M: StorageMedium> TemplateService<'s, M> {
    pub fn new(store: &'s mut DocumentStore<M>) -> Self {
        Self {
            repo: CollectionRepository::new(store),
        }
    }

    pub fn list_templates(&mut self) -> Vec<TaskTemplate> {
        self.repo.load::<TaskTemplates>()
    }

    pub fn get_template(&mut self, id: &RecordId) -> Option<TaskTemplate> {
        self.repo
            .load::<TaskTemplates>()
            .into_iter()
            .find(|template| template.id() == id)
    }

    /// Validates action mappings, then stores `template` with a fresh id.
    ///
    /// # Errors
    /// - `InvalidMapping` when an action maps undeclared fields or leaves a
    ///   required field unmapped.
    /// - `Repo` when `taskTemplates` cannot be decoded or the write is rejected.
    pub fn create_template(&mut self, template: TaskTemplate) -> Result<RecordId, TemplateError> {
        validate_actions(&template.on_complete)?;

        let now = now_rfc3339();
        let id = self
            .repo
            .modify::<TaskTemplates, _>(|templates| append_record(templates, template, &now))?;
        info!("event=template_create module=template status=ok template_id={id}");
        Ok(id)
    }

    /// Looks up a template by id and runs it for `client_id`.
    pub fn run(
        &mut self,
        template_id: &RecordId,
        client_id: &str,
        form: &FormValues,
    ) -> Result<TemplateRunReport, TemplateError> {
        let template = self
            .get_template(template_id)
            .ok_or_else(|| TemplateError::NotFound(template_id.clone()))?;
        Ok(self.run_template(&template, client_id, form, &now_rfc3339()))
    }

    /// Runs every `onComplete` action of `template` in order.
    ///
    /// Never fails as a whole: each action's result lands in the report.
    pub fn run_template(
        &mut self,
        template: &TaskTemplate,
        client_id: &str,
        form: &FormValues,
        now: &str,
    ) -> TemplateRunReport {
        let outcomes = template
            .on_complete
            .iter()
            .map(|action| self.apply_action(template.id(), action, client_id, form, now))
            .collect();
        let report = TemplateRunReport {
            template_id: template.id().clone(),
            client_id: client_id.to_string(),
            outcomes,
        };

        if report.failed() > 0 {
            warn!(
                "event=template_run module=template status=partial template_id={} applied={} skipped={} ignored={} failed={}",
                report.template_id,
                report.applied(),
                report.skipped(),
                report.ignored(),
                report.failed()
            );
        } else {
            info!(
                "event=template_run module=template status=ok template_id={} applied={} skipped={} ignored={}",
                report.template_id,
                report.applied(),
                report.skipped(),
                report.ignored()
            );
        }
        report
    }

    fn apply_action(
        &mut self,
        template_id: &RecordId,
        action: &TemplateAction,
        client_id: &str,
        form: &FormValues,
        now: &str,
    ) -> ActionOutcome {
        let kind = action.kind();
        match action {
            TemplateAction::Unknown => ActionOutcome::Ignored,
            TemplateAction::CreateDigitalAsset { asset_type, fields } => {
                self.with_fields(kind, fields, form, |repo, resolved| {
                    let asset = DigitalAsset {
                        name: resolved.required("name").to_string(),
                        asset_type: asset_type.clone(),
                        url: resolved.get("url").map(str::to_string),
                        notes: resolved.get("notes").map(str::to_string),
                        source_template_id: Some(template_id.clone()),
                        ..DigitalAsset::default()
                    };
                    let id = repo.append::<DigitalAssets, _>(client_id, asset, now)?;
                    Ok((DigitalAssets::KEY, Some(id)))
                })
            }
            TemplateAction::CaptureCredentials { fields } => {
                self.with_fields(kind, fields, form, |repo, resolved| {
                    let credential = Credential {
                        service: resolved.required("service").to_string(),
                        username: resolved.required("username").to_string(),
                        password: resolved.get("password").map(str::to_string),
                        url: resolved.get("url").map(str::to_string),
                        source_template_id: Some(template_id.clone()),
                        ..Credential::default()
                    };
                    let id = repo.append::<Credentials, _>(client_id, credential, now)?;
                    Ok((Credentials::KEY, Some(id)))
                })
            }
            TemplateAction::WriteKv { key, fields } => {
                let kv_key = normalize_kv_key(key);
                if kv_key.is_empty() {
                    return ActionOutcome::Skipped {
                        kind,
                        missing: vec!["key"],
                    };
                }
                self.with_fields(kind, fields, form, |repo, resolved| {
                    let value = resolved.required("value").to_string();
                    let id = repo.modify::<KeyValueIndex, _>(|index| {
                        upsert_kv(index, client_id, &kv_key, value, template_id, now)
                    })?;
                    Ok((KeyValueIndex::KEY, Some(id)))
                })
            }
            TemplateAction::SetClientServiceActive { service } => {
                let service = service.trim();
                if service.is_empty() {
                    return ActionOutcome::Skipped {
                        kind,
                        missing: vec!["service"],
                    };
                }
                let written = self.repo.modify::<ClientServices, _>(|services| {
                    let activation = services
                        .entry(client_id.to_string())
                        .or_default()
                        .entry(service.to_string())
                        .or_default();
                    if !activation.active {
                        activation.active = true;
                        activation.activated_at = Some(now.to_string());
                    }
                    activation.updated_at = now.to_string();
                });
                outcome(kind, written.map(|()| (ClientServices::KEY, None)))
            }
        }
    }

    fn with_fields(
        &mut self,
        kind: ActionKind,
        mapping: &FieldMapping,
        form: &FormValues,
        write: impl FnOnce(
            &mut CollectionRepository<'s, M>,
            &ResolvedFields,
        ) -> RepoResult<(&'static str, Option<RecordId>)>,
    ) -> ActionOutcome {
        match mapping.resolve(kind, form) {
            Ok(resolved) => outcome(kind, write(&mut self.repo, &resolved)),
            Err(missing) => ActionOutcome::Skipped { kind, missing },
        }
    }
}

fn outcome(
    kind: ActionKind,
    written: RepoResult<(&'static str, Option<RecordId>)>,
) -> ActionOutcome {
    match written {
        Ok((collection, record_id)) => ActionOutcome::Applied {
            kind,
            collection,
            record_id,
        },
        Err(error) => {
            warn!(
                "event=template_action module=template status=error kind={kind} collection={} error={error}",
                error.collection()
            );
            ActionOutcome::Failed { kind, error }
        }
    }
}

fn validate_actions(actions: &[TemplateAction]) -> Result<(), TemplateError> {
    for (index, action) in actions.iter().enumerate() {
        let Some(mapping) = action.mapping() else {
            continue;
        };
        let issues = mapping.check(action.kind());
        if !issues.is_empty() {
            return Err(TemplateError::InvalidMapping {
                index,
                kind: action.kind(),
                issues,
            });
        }
    }
    Ok(())
}

fn upsert_kv(
    index: &mut Partitioned<KeyValueEntry>,
    client_id: &str,
    key: &str,
    value: String,
    template_id: &RecordId,
    now: &str,
) -> RecordId {
    let existing = index
        .get_mut(client_id)
        .and_then(|entries| entries.iter_mut().find(|entry| entry.key == key));
    if let Some(existing) = existing {
        existing.value = value;
        existing.source_template_id = Some(template_id.clone());
        existing.touch(now);
        return existing.id().clone();
    }
    let entry = KeyValueEntry {
        key: key.to_string(),
        value,
        source_template_id: Some(template_id.clone()),
        ..KeyValueEntry::default()
    };
    append_partitioned(index, client_id, entry, now)
}

/// Lowercases and joins words with `_`, e.g. `"GA4 Property ID"` → `"ga4_property_id"`.
pub fn normalize_kv_key(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    KV_KEY_SEPARATOR_RE
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}
