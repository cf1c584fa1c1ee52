//! Settings bootstrap and edits.
//!
//! # Invariants
//! - Defaults are written only when no settings document exists.
//! - A stored document is never overwritten by defaults, even if partial;
//!   missing fields are filled on read by serde defaults.

use crate::model::collections::SettingsDoc;
use crate::model::settings::Settings;
use crate::repo::collection_repo::{CollectionRepository, RepoResult};
use crate::store::{DocumentStore, StorageMedium};
use log::{info, warn};

/// Returns the stored settings, writing the default document first if absent.
pub fn ensure_default_settings<M: StorageMedium>(store: &mut DocumentStore<M>) -> Settings {
    let mut repo = CollectionRepository::new(store);
    if repo.exists::<SettingsDoc>() {
        return repo.load::<SettingsDoc>();
    }

    let settings = Settings::default();
    if repo.save::<SettingsDoc>(&settings) {
        info!("event=settings_init module=settings status=ok origin=default");
    } else {
        warn!("event=settings_init module=settings status=error reason=persist_failed");
    }
    settings
}

/// Loads settings, applies `edit` and writes them back.
///
/// # Errors
/// `ShapeMismatch` when the stored settings cannot be decoded (nothing is
/// written), `PersistFailed` when the store rejects the write.
pub fn update_settings<M: StorageMedium>(
    store: &mut DocumentStore<M>,
    edit: impl FnOnce(&mut Settings),
) -> RepoResult<Settings> {
    CollectionRepository::new(store).modify::<SettingsDoc, _>(|settings| {
        edit(settings);
        settings.clone()
    })
}
