// src/db/identity_repository.rs
// DOCUMENTATION: Read-only identity lookups for owners and review authors

use crate::errors::ListingsError;
use crate::models::Identity;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve a batch of identities; unknown ids are simply absent
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Identity>, ListingsError>;
}

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Identity>, ListingsError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Identity>("SELECT id, username, email FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Failed to resolve {} identities: {}", ids.len(), e);
                ListingsError::PersistenceError(e.to_string())
            })
    }
}
