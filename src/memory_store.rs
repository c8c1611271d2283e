//! In-memory client storage.
//!
//! Backs demo deployments without a database and the integration tests.
//! Filtering, sorting and pagination follow the same semantics as the
//! PostgreSQL store.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Client, CreateClientRequest, PaginatedResponse, UpdateClientRequest};
use crate::repository::{
    apply_update, new_client_from_request, total_pages, ClientQuery, ClientRepository, SortField,
    SortOrder,
};

#[derive(Default)]
pub struct MemoryClientStore {
    clients: RwLock<HashMap<Uuid, Client>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Client>>, AppError> {
        self.clients
            .read()
            .map_err(|_| AppError::InternalError("client store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Client>>, AppError> {
        self.clients
            .write()
            .map_err(|_| AppError::InternalError("client store lock poisoned".to_string()))
    }
}

fn matches(client: &Client, query: &ClientQuery) -> bool {
    if let Some(ref search) = query.search {
        let needle = search.to_lowercase();
        let hit = client
            .nom
            .as_deref()
            .map(|s| s.to_lowercase().contains(&needle))
            .unwrap_or(false)
            || client
                .prenom
                .as_deref()
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false);
        if !hit {
            return false;
        }
    }

    if let Some(ref mix) = query.credit_mix {
        if client.credit_mix.map(|m| m.to_string()).as_deref() != Some(mix.as_str()) {
            return false;
        }
    }

    if let Some(ref label) = query.credit_score {
        if client.credit_score.map(|l| l.to_string()).as_deref() != Some(label.as_str()) {
            return false;
        }
    }

    true
}

fn compare(a: &Client, b: &Client, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Nom => a.nom.cmp(&b.nom),
        SortField::Prenom => a.prenom.cmp(&b.prenom),
        SortField::Age => a.age.cmp(&b.age),
        SortField::OutstandingDebt => a
            .outstanding_debt
            .partial_cmp(&b.outstanding_debt)
            .unwrap_or(Ordering::Equal),
    }
}

#[async_trait]
impl ClientRepository for MemoryClientStore {
    async fn list(&self, query: &ClientQuery) -> Result<PaginatedResponse<Client>, AppError> {
        let mut matching: Vec<Client> = self
            .read()?
            .values()
            .filter(|c| matches(c, query))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let data: Vec<Client> = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();

        Ok(PaginatedResponse {
            data,
            total,
            page: query.page,
            page_size: query.page_size,
            total_pages: total_pages(total, query.page_size),
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn create(&self, data: CreateClientRequest) -> Result<Client, AppError> {
        let client = new_client_from_request(data);
        self.write()?.insert(client.id, client.clone());
        Ok(client)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateClientRequest,
    ) -> Result<Option<Client>, AppError> {
        let mut clients = self.write()?;
        let Some(existing) = clients.get(&id).cloned() else {
            return Ok(None);
        };

        let merged = apply_update(existing, changes);
        clients.insert(id, merged.clone());
        Ok(Some(merged))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<Client>, AppError> {
        let mut clients: Vec<Client> = self.read()?.values().cloned().collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clients)
    }
}
