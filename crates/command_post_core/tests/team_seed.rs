use command_post_core::model::records::MemberKind;
use command_post_core::service::team_seed::{default_team, DEFAULT_SEED_PATH};
use command_post_core::store::MemoryMedium;
use command_post_core::{initialize_team, DocumentStore, FileSeedSource, SeedError, SeedSource};
use serde_json::json;
use std::cell::Cell;

/// Networked source whose server answers 404.
struct Unreachable;

impl SeedSource for Unreachable {
    fn fetch(&self) -> Result<String, SeedError> {
        Err(SeedError::BadStatus(404))
    }
}

/// Counts fetches and serves a fixed roster.
struct Counting {
    body: String,
    calls: Cell<usize>,
}

impl SeedSource for Counting {
    fn fetch(&self) -> Result<String, SeedError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.body.clone())
    }
}

#[test]
fn unreachable_seed_falls_back_to_default_roster() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let team = initialize_team(&mut store, &Unreachable);

    assert_eq!(team.inhouse.len(), 8);
    assert_eq!(team.contractors.len(), 8);
    assert_eq!(team, default_team());
    assert_eq!(
        store.get("teamData", json!(null))["contractors"][0]["type"],
        json!("contractor")
    );
}

#[test]
fn malformed_seed_falls_back_to_default_roster() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    let source = Counting {
        body: "<html>503</html>".to_string(),
        calls: Cell::new(0),
    };
    let team = initialize_team(&mut store, &source);
    assert_eq!(team.len(), 16);
}

#[test]
fn stored_roster_is_not_reseeded() {
    let mut store = DocumentStore::new(MemoryMedium::new());
    assert!(store.set(
        "teamData",
        json!({ "inhouse": [{ "id": 1, "name": "Solo", "email": "solo@agency.example" }], "contractors": [] })
    ));
    let source = Counting {
        body: r#"{"inhouse":[],"contractors":[]}"#.to_string(),
        calls: Cell::new(0),
    };

    let team = initialize_team(&mut store, &source);
    assert_eq!(source.calls.get(), 0);
    assert_eq!(team.inhouse.len(), 1);
    assert!(team.find_by_email("SOLO@agency.example").is_some());
}

#[test]
fn file_seed_is_loaded_once_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(
        dir.path().join(DEFAULT_SEED_PATH),
        r#"{
            "inhouse": [{ "id": 1, "name": "Maya", "role": "Director", "email": "maya@a.example" }],
            "contractors": [{ "id": 101, "name": "Ben", "role": "Editor", "email": "ben@f.example" }]
        }"#,
    )
    .unwrap();

    let source = FileSeedSource::new(dir.path(), DEFAULT_SEED_PATH);
    let mut store = DocumentStore::new(MemoryMedium::new());
    let team = initialize_team(&mut store, &source);

    assert_eq!(team.len(), 2);
    assert_eq!(team.contractors[0].kind, MemberKind::Contractor);
    assert!(store.medium().raw("goh_teamData").is_some());

    std::fs::remove_file(source.path()).unwrap();
    assert_eq!(initialize_team(&mut store, &source), team);
}
