// src/db/review_repository.rs
// DOCUMENTATION: Review store - read access and cascade removal for listing reviews
// PURPOSE: Let the aggregator resolve reviews without owning their lifecycle

use crate::errors::ListingsError;
use crate::models::Review;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Reviews attached to a listing, oldest first
    async fn reviews_for_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, ListingsError>;

    /// Remove every review attached to a listing, returning how many went
    async fn delete_for_listing(&self, listing_id: Uuid) -> Result<u64, ListingsError>;
}

pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn reviews_for_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, ListingsError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, listing_id, author_id, body, rating, created_at
            FROM reviews
            WHERE listing_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch reviews for listing {}: {}", listing_id, e);
            ListingsError::PersistenceError(format!("Fetch reviews failed: {}", e))
        })?;

        Ok(reviews)
    }

    async fn delete_for_listing(&self, listing_id: Uuid) -> Result<u64, ListingsError> {
        let result = sqlx::query("DELETE FROM reviews WHERE listing_id = $1")
            .bind(listing_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete reviews for listing {}: {}", listing_id, e);
                ListingsError::PersistenceError(format!("Delete reviews failed: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}
