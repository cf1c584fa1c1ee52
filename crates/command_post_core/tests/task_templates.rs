use command_post_core::model::collections::{
    ClientServices, Collection, Credentials, DigitalAssets, KeyValueIndex, TaskTemplates,
};
use command_post_core::model::records::{Credential, DigitalAsset, KeyValueEntry, Partitioned};
use command_post_core::model::template::{ActionKind, FieldMapping, MappingIssue};
use command_post_core::store::{MediumError, MediumResult, MemoryMedium, StorageMedium};
use command_post_core::{
    ActionOutcome, DocumentStore, FormValues, RecordId, RepoError, TaskTemplate, TemplateAction,
    TemplateError, TemplateService,
};
use serde_json::json;

const NOW: &str = "2024-05-01T09:00:00Z";

fn form(pairs: &[(&str, &str)]) -> FormValues {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn website_template() -> TaskTemplate {
    TaskTemplate {
        id: RecordId::Int(1),
        name: "Website handover".to_string(),
        on_complete: vec![
            TemplateAction::CreateDigitalAsset {
                asset_type: "website".to_string(),
                fields: FieldMapping::new()
                    .map("name", "siteName")
                    .map("url", "siteUrl"),
            },
            TemplateAction::WriteKv {
                key: "Hosting Provider".to_string(),
                fields: FieldMapping::new().map("value", "host"),
            },
        ],
        ..TaskTemplate::default()
    }
}

fn load<C: Collection>(store: &mut DocumentStore<impl StorageMedium>) -> C::Document {
    store.load(C::KEY, C::Document::default())
}

#[test]
fn missing_kv_source_still_creates_asset() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let report = TemplateService::new(&mut store).run_template(
        &website_template(),
        "42",
        &form(&[("siteName", "Acme main site"), ("siteUrl", "https://acme.example")]),
        NOW,
    );

    assert_eq!(report.applied(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(
        report.outcomes[1],
        ActionOutcome::Skipped {
            kind: ActionKind::WriteKv,
            missing: vec!["value"],
        }
    );

    let assets: Partitioned<DigitalAsset> = load::<DigitalAssets>(&mut store);
    assert_eq!(assets["42"].len(), 1);
    assert_eq!(assets["42"][0].name, "Acme main site");
    assert_eq!(assets["42"][0].url.as_deref(), Some("https://acme.example"));
    assert_eq!(assets["42"][0].source_template_id, Some(RecordId::Int(1)));

    let index: Partitioned<KeyValueEntry> = load::<KeyValueIndex>(&mut store);
    assert!(index.get("42").map_or(true, Vec::is_empty));
}

#[test]
fn blank_required_value_counts_as_missing() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let report = TemplateService::new(&mut store).run_template(
        &website_template(),
        "42",
        &form(&[("siteName", "   "), ("host", "Kinsta")]),
        NOW,
    );

    assert_eq!(report.applied(), 1);
    assert_eq!(report.skipped(), 1);
    assert!(load::<DigitalAssets>(&mut store).is_empty());
    assert_eq!(load::<KeyValueIndex>(&mut store)["42"][0].key, "hosting_provider");
}

#[test]
fn write_kv_upserts_by_normalized_key() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let template = TaskTemplate {
        id: RecordId::Int(3),
        on_complete: vec![TemplateAction::WriteKv {
            key: "GA4 Property ID".to_string(),
            fields: FieldMapping::new().map("value", "ga4"),
        }],
        ..TaskTemplate::default()
    };

    let mut service = TemplateService::new(&mut store);
    service.run_template(&template, "7", &form(&[("ga4", "G-111")]), NOW);
    service.run_template(&template, "7", &form(&[("ga4", "G-222")]), "2024-05-02T09:00:00Z");
    service.run_template(&template, "8", &form(&[("ga4", "G-333")]), NOW);

    let index = load::<KeyValueIndex>(&mut store);
    assert_eq!(index["7"].len(), 1);
    assert_eq!(index["7"][0].key, "ga4_property_id");
    assert_eq!(index["7"][0].value, "G-222");
    assert_eq!(index["7"][0].created_at, NOW);
    assert_eq!(index["7"][0].updated_at, "2024-05-02T09:00:00Z");
    assert_eq!(index["8"][0].id, RecordId::Int(2));
}

#[test]
fn service_activation_keeps_first_activation_time() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let template = TaskTemplate {
        id: RecordId::Int(4),
        on_complete: vec![TemplateAction::SetClientServiceActive {
            service: "seo".to_string(),
        }],
        ..TaskTemplate::default()
    };

    let mut service = TemplateService::new(&mut store);
    service.run_template(&template, "9", &FormValues::new(), NOW);
    service.run_template(&template, "9", &FormValues::new(), "2024-06-01T00:00:00Z");

    let services = load::<ClientServices>(&mut store);
    let seo = &services["9"]["seo"];
    assert!(seo.active);
    assert_eq!(seo.activated_at.as_deref(), Some(NOW));
    assert_eq!(seo.updated_at, "2024-06-01T00:00:00Z");
}

#[test]
fn unknown_actions_are_ignored() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    assert!(store.set(
        TaskTemplates::KEY,
        json!([{
            "id": 5,
            "name": "Legacy",
            "onComplete": [
                { "type": "send_fax", "number": "555" },
                { "type": "capture_credentials",
                  "fields": { "service": "svc", "username": "user", "password": "pass" } }
            ]
        }])
    ));

    let report = TemplateService::new(&mut store)
        .run(
            &RecordId::Int(5),
            "11",
            &form(&[("svc", "WordPress"), ("user", "admin"), ("pass", "s3cret")]),
        )
        .unwrap();

    assert_eq!(report.outcomes[0], ActionOutcome::Ignored);
    assert_eq!(report.applied(), 1);
    let credentials: Partitioned<Credential> = load::<Credentials>(&mut store);
    assert_eq!(credentials["11"][0].service, "WordPress");
    assert_eq!(credentials["11"][0].password.as_deref(), Some("s3cret"));
    assert!(!format!("{:?}", credentials["11"][0]).contains("s3cret"));
}

#[test]
fn run_unknown_template_is_not_found() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let err = TemplateService::new(&mut store)
        .run(&RecordId::Int(99), "1", &FormValues::new())
        .unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(RecordId::Int(99))));
}

/// Memory medium that rejects writes to one namespaced key.
struct RejectKey {
    inner: MemoryMedium,
    rejected: &'static str,
}

impl StorageMedium for RejectKey {
    fn read(&self, key: &str) -> MediumResult<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> MediumResult<()> {
        if key == self.rejected {
            return Err(MediumError::Unavailable(key.to_string()));
        }
        self.inner.write(key, value)
    }

    fn remove(&mut self, key: &str) -> MediumResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn failed_action_does_not_roll_back_earlier_ones() {
    let mut store = DocumentStore::new(RejectKey {
        inner: MemoryMedium::new(),
        rejected: "goh_keyValueIndex",
    });
    let report = TemplateService::new(&mut store).run_template(
        &website_template(),
        "42",
        &form(&[("siteName", "Acme"), ("host", "Kinsta")]),
        NOW,
    );

    assert!(report.is_partial());
    assert_eq!(
        report.outcomes[1],
        ActionOutcome::Failed {
            kind: ActionKind::WriteKv,
            error: RepoError::PersistFailed(KeyValueIndex::KEY),
        }
    );
    assert_eq!(load::<DigitalAssets>(&mut store)["42"].len(), 1);
    assert!(load::<KeyValueIndex>(&mut store).is_empty());
}

#[test]
fn create_template_validates_mappings_and_assigns_ids() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let mut service = TemplateService::new(&mut store);

    let bad = TaskTemplate {
        name: "Bad".to_string(),
        on_complete: vec![TemplateAction::CaptureCredentials {
            fields: FieldMapping::new().map("service", "svc").map("pin", "pin"),
        }],
        ..TaskTemplate::default()
    };
    match service.create_template(bad).unwrap_err() {
        TemplateError::InvalidMapping { index, kind, issues } => {
            assert_eq!(index, 0);
            assert_eq!(kind, ActionKind::CaptureCredentials);
            assert_eq!(
                issues,
                vec![
                    MappingIssue::MissingRequired("username"),
                    MappingIssue::UndeclaredTarget("pin".to_string()),
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    let first = service.create_template(website_template()).unwrap();
    let second = service.create_template(website_template()).unwrap();
    assert_eq!((first, second.clone()), (RecordId::Int(1), RecordId::Int(2)));
    assert_eq!(service.list_templates().len(), 2);
    assert!(service.get_template(&second).is_some());
}
