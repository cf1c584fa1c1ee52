//! Team roster seeding with a built-in fallback dataset.
//!
//! # Responsibility
//! - Fetch the external team roster once, when no roster is stored yet.
//! - Fall back to the built-in roster on any fetch or parse failure.
//!
//! # Invariants
//! - `initialize_team` never returns an error and never panics.
//! - An already stored roster is returned untouched; the seed is not read.
//! - The built-in roster holds 8 in-house and 8 contractor members.

use crate::model::collections::Team;
use crate::model::ids::RecordId;
use crate::model::records::{MemberKind, TeamDirectory, TeamMember};
use crate::repo::collection_repo::CollectionRepository;
use crate::store::{DocumentStore, StorageMedium};
use log::{info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Relative location of the roster file under the app's data directory.
pub const DEFAULT_SEED_PATH: &str = "data/team.json";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed source unavailable: {0}")]
    Unavailable(String),
    /// A networked source (for example an HTTP fetch of the roster)
    /// answered with a non-success status. File sources never report it.
    #[error("seed source answered with status {0}")]
    BadStatus(u16),
    #[error("seed document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where the raw roster JSON comes from.
pub trait SeedSource {
    fn fetch(&self) -> Result<String, SeedError>;
}

/// Reads the roster from a file relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileSeedSource {
    path: PathBuf,
}

impl FileSeedSource {
    pub fn new(base_dir: impl AsRef<Path>, relative_path: impl AsRef<Path>) -> Self {
        Self {
            path: base_dir.as_ref().join(relative_path),
        }
    }

    /// Reads the roster from exactly `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedSource for FileSeedSource {
    fn fetch(&self) -> Result<String, SeedError> {
        std::fs::read_to_string(&self.path)
            .map_err(|err| SeedError::Unavailable(format!("{}: {err}", self.path.display())))
    }
}

/// Returns the stored roster, seeding it first when absent.
///
/// Seed failures are logged and replaced by [`default_team`].
pub fn initialize_team<M: StorageMedium>(
    store: &mut DocumentStore<M>,
    source: &dyn SeedSource,
) -> TeamDirectory {
    let mut repo = CollectionRepository::new(store);
    if repo.exists::<Team>() {
        return repo.load::<Team>();
    }

    let (team, origin) = match load_seed(source) {
        Ok(team) => (team, "seed"),
        Err(err) => {
            warn!("event=team_seed module=seed status=fallback error={err}");
            (default_team(), "default")
        }
    };

    let saved = repo.save::<Team>(&team);
    info!(
        "event=team_seed module=seed status=ok origin={origin} members={} saved={saved}",
        team.len()
    );
    team
}

fn load_seed(source: &dyn SeedSource) -> Result<TeamDirectory, SeedError> {
    let raw = source.fetch()?;
    let mut team: TeamDirectory = serde_json::from_str(&raw)?;
    for member in &mut team.inhouse {
        member.kind = MemberKind::Inhouse;
    }
    for member in &mut team.contractors {
        member.kind = MemberKind::Contractor;
    }
    Ok(team)
}

const DEFAULT_INHOUSE: [(&str, &str, &str); 8] = [
    ("Maya Ortiz", "Managing Director", "maya@agency.example"),
    ("Devon Price", "Account Director", "devon@agency.example"),
    ("Priya Raman", "SEO Lead", "priya@agency.example"),
    ("Lucas Weber", "Paid Media Manager", "lucas@agency.example"),
    ("Hana Sato", "Content Strategist", "hana@agency.example"),
    ("Omar Haddad", "Web Developer", "omar@agency.example"),
    ("Grace Liu", "Designer", "grace@agency.example"),
    ("Tom Becker", "Operations Coordinator", "tom@agency.example"),
];

const DEFAULT_CONTRACTORS: [(&str, &str, &str); 8] = [
    ("Ana Ferreira", "Copywriter", "ana@freelance.example"),
    ("Ben Carter", "Video Editor", "ben@freelance.example"),
    ("Chloe Martin", "Social Media Specialist", "chloe@freelance.example"),
    ("Diego Ruiz", "PPC Specialist", "diego@freelance.example"),
    ("Elif Demir", "Illustrator", "elif@freelance.example"),
    ("Felix Novak", "WordPress Developer", "felix@freelance.example"),
    ("Gina Rossi", "Photographer", "gina@freelance.example"),
    ("Hugo Laurent", "Email Marketer", "hugo@freelance.example"),
];

/// Built-in roster used when no seed can be loaded.
pub fn default_team() -> TeamDirectory {
    TeamDirectory {
        inhouse: default_members(&DEFAULT_INHOUSE, MemberKind::Inhouse, 1),
        contractors: default_members(&DEFAULT_CONTRACTORS, MemberKind::Contractor, 101),
    }
}

fn default_members(
    rows: &[(&str, &str, &str)],
    kind: MemberKind,
    first_id: u64,
) -> Vec<TeamMember> {
    rows.iter()
        .zip(first_id..)
        .map(|((name, role, email), id)| TeamMember {
            id: RecordId::Int(id),
            name: (*name).to_string(),
            role: (*role).to_string(),
            email: (*email).to_string(),
            kind,
            status: "active".to_string(),
            ..TeamMember::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{default_team, load_seed, SeedError, SeedSource};
    use crate::model::records::MemberKind;

    struct Fixed(&'static str);

    impl SeedSource for Fixed {
        fn fetch(&self) -> Result<String, SeedError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn default_team_has_eight_of_each_kind() {
        let team = default_team();
        assert_eq!(team.inhouse.len(), 8);
        assert_eq!(team.contractors.len(), 8);
        assert!(team
            .contractors
            .iter()
            .all(|member| member.kind == MemberKind::Contractor));
    }

    #[test]
    fn seed_membership_follows_list_not_type_field() {
        let team = load_seed(&Fixed(
            r#"{"inhouse":[{"id":1,"name":"A","type":"contractor"}],"contractors":[]}"#,
        ))
        .expect("seed parses");
        assert_eq!(team.inhouse[0].kind, MemberKind::Inhouse);
    }

    #[test]
    fn malformed_seed_is_reported() {
        let err = load_seed(&Fixed("{not json")).expect_err("malformed seed");
        assert!(matches!(err, SeedError::Malformed(_)));
    }
}
