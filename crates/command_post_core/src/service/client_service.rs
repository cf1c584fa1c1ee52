//! Client roster use-cases.
//!
//! # Responsibility
//! - Add clients to a division and remove them by id.
//!
//! # Invariants
//! - Client ids are unique across both divisions of `clientsData`.
//! - Removing a client touches only `clientsData`; per-client collections
//!   (contacts, assets, credentials, notes, ...) keep their partitions.

use crate::model::collections::Clients;
use crate::model::ids::{now_rfc3339, Record, RecordId};
use crate::model::records::{Client, Division};
use crate::repo::collection_repo::{
    append_partitioned, locate_record, CollectionRepository, RepoError,
};
use crate::store::{DocumentStore, StorageMedium};
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientServiceError {
    #[error("client name must not be empty")]
    EmptyName,
    #[error("client not found: {0}")]
    NotFound(RecordId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type ClientResult<T> = Result<T, ClientServiceError>;

/// Use-case service over the `clientsData` collection.
pub struct ClientRoster<'s, M: StorageMedium> {
    repo: CollectionRepository<'s, M>,
}

impl<'s, M: StorageMedium> ClientRoster<'s, M> {
    pub fn new(store: &'s mut DocumentStore<M>) -> Self {
        Self {
            repo: CollectionRepository::new(store),
        }
    }

    /// Adds `client` to `division` with a fresh id; status defaults to `active`.
    pub fn add_client(&mut self, division: Division, mut client: Client) -> ClientResult<Client> {
        let name = client.name.trim().to_string();
        if name.is_empty() {
            return Err(ClientServiceError::EmptyName);
        }
        client.name = name;
        if client.status.trim().is_empty() {
            client.status = "active".to_string();
        }

        let now = now_rfc3339();
        let id = self.repo.modify::<Clients, _>(|clients| {
            append_partitioned(clients, division.as_str(), client.clone(), &now)
        })?;
        client.set_id(id.clone());
        client.touch(&now);
        info!(
            "event=client_add module=client status=ok division={} client_id={id}",
            division.as_str()
        );
        Ok(client)
    }

    /// Removes a client from whichever division holds it.
    pub fn remove_client(&mut self, id: &RecordId) -> ClientResult<Client> {
        let mut clients = self.repo.load_for_write::<Clients>()?;
        let (division, index) =
            locate_record(&clients, id).ok_or_else(|| ClientServiceError::NotFound(id.clone()))?;
        let removed = clients.entry(division).or_default().remove(index);

        self.repo.persist::<Clients>(&clients)?;
        info!("event=client_remove module=client status=ok client_id={id}");
        Ok(removed)
    }

    pub fn list_clients(&mut self, division: Division) -> Vec<Client> {
        self.repo.partition::<Clients, _>(division.as_str())
    }

    /// Finds a client in either division.
    pub fn find_client(&mut self, id: &RecordId) -> Option<(Division, Client)> {
        let clients = self.repo.load::<Clients>();
        let (division, index) = locate_record(&clients, id)?;
        let client = clients.get(&division)?.get(index)?.clone();
        Some((Division::parse(&division)?, client))
    }
}
