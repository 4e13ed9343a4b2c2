// src/db/listing_repository.rs
// DOCUMENTATION: Listing store - trait seam plus PostgreSQL/PostGIS implementation
// PURPOSE: Abstract listing persistence from the lifecycle manager

use crate::errors::ListingsError;
use crate::models::{Geometry, Listing, ListingChanges, ListingDraft, ListingImage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Scan filter accepted by `ListingStore::find`
#[derive(Debug, Clone)]
pub enum ListingFilter {
    All,
    /// Compiled pattern tested against `location`
    LocationMatches(Regex),
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            ListingFilter::All => true,
            ListingFilter::LocationMatches(pattern) => pattern.is_match(&listing.location),
        }
    }
}

/// Keyed document storage for listings
/// DOCUMENTATION: Absence is reported as `Ok(None)`; only infrastructure
/// failures come back as `PersistenceError`
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn find(&self, filter: &ListingFilter) -> Result<Vec<Listing>, ListingsError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, ListingsError>;

    async fn insert(&self, draft: &ListingDraft) -> Result<Listing, ListingsError>;

    async fn update_by_id(
        &self,
        id: Uuid,
        changes: &ListingChanges,
    ) -> Result<Option<Listing>, ListingsError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Listing>, ListingsError>;
}

/// Internal struct for mapping database rows to Listing
/// DOCUMENTATION: Handles PostGIS POINT extraction via ST_X() and ST_Y();
/// both are NULL when the listing was never geocoded
#[derive(Debug, FromRow)]
struct ListingRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub country: String,
    pub image_url: String,
    pub image_filename: String,
    pub longitude: Option<f64>, // From ST_X(geometry)
    pub latitude: Option<f64>,  // From ST_Y(geometry)
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingRow {
    fn into_listing(self) -> Listing {
        let geometry = match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Geometry::point(lon, lat),
            _ => None,
        };

        Listing {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            country: self.country,
            image: ListingImage {
                url: self.image_url,
                filename: self.image_filename,
            },
            geometry,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const LISTING_COLUMNS: &str = r#"
    id, title, description, price, location, country,
    image_url, image_filename,
    ST_X(geometry) AS longitude, ST_Y(geometry) AS latitude,
    owner_id, created_at, updated_at
"#;

/// PgListingStore: listing persistence on PostgreSQL + PostGIS
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    /// Full scan ordered by creation; pattern filters run on the fetched rows
    /// so the match semantics are those of the compiled Rust pattern
    /// NOTE: every search reads the whole table (O(rows) per query). Pushing
    /// the pattern into SQL would trade that for PostgreSQL's regex dialect.
    async fn find(&self, filter: &ListingFilter) -> Result<Vec<Listing>, ListingsError> {
        let sql = format!(
            "SELECT {} FROM listings ORDER BY created_at ASC, id ASC",
            LISTING_COLUMNS
        );

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Listing scan failed: {}", e);
                ListingsError::PersistenceError(e.to_string())
            })?;

        let listings: Vec<Listing> = rows
            .into_iter()
            .map(ListingRow::into_listing)
            .filter(|l| filter.matches(l))
            .collect();

        log::debug!("Listing scan returned {} rows", listings.len());
        Ok(listings)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, ListingsError> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching listing {}: {}", id, e);
                ListingsError::PersistenceError(e.to_string())
            })?;

        Ok(row.map(ListingRow::into_listing))
    }

    async fn insert(&self, draft: &ListingDraft) -> Result<Listing, ListingsError> {
        let sql = format!(
            r#"
            INSERT INTO listings (
                title, description, price, location, country,
                image_url, image_filename, geometry, owner_id,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5,
                $6, $7,
                CASE WHEN $8::float8 IS NULL OR $9::float8 IS NULL THEN NULL
                     ELSE ST_SetSRID(ST_MakePoint($8, $9), 4326) END,
                $10,
                NOW(), NOW()
            )
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(&draft.fields.title) // $1
            .bind(&draft.fields.description) // $2
            .bind(draft.fields.price) // $3
            .bind(&draft.fields.location) // $4
            .bind(&draft.fields.country) // $5
            .bind(&draft.image.url) // $6
            .bind(&draft.image.filename) // $7
            .bind(draft.geometry.map(|g| g.longitude())) // $8
            .bind(draft.geometry.map(|g| g.latitude())) // $9
            .bind(draft.owner_id) // $10
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Failed to create listing: {}", e);
                ListingsError::PersistenceError(e.to_string())
            })?;

        let listing = row.into_listing();
        log::info!("Created listing with id: {}", listing.id);
        Ok(listing)
    }

    /// Partial update - only provided fields are modified
    async fn update_by_id(
        &self,
        id: Uuid,
        changes: &ListingChanges,
    ) -> Result<Option<Listing>, ListingsError> {
        let sql = format!(
            r#"
            UPDATE listings
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                location = COALESCE($4, location),
                country = COALESCE($5, country),
                image_url = COALESCE($6, image_url),
                image_filename = COALESCE($7, image_filename),
                geometry = CASE WHEN $8::float8 IS NULL OR $9::float8 IS NULL THEN geometry
                                ELSE ST_SetSRID(ST_MakePoint($8, $9), 4326) END,
                updated_at = NOW()
            WHERE id = $10
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let fields = &changes.fields;
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.price)
            .bind(&fields.location)
            .bind(&fields.country)
            .bind(changes.image.as_ref().map(|i| i.url.as_str()))
            .bind(changes.image.as_ref().map(|i| i.filename.as_str()))
            .bind(changes.geometry.map(|g| g.longitude()))
            .bind(changes.geometry.map(|g| g.latitude()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Update failed for listing {}: {}", id, e);
                ListingsError::PersistenceError(e.to_string())
            })?;

        Ok(row.map(ListingRow::into_listing))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Listing>, ListingsError> {
        let sql = format!("DELETE FROM listings WHERE id = $1 RETURNING {}", LISTING_COLUMNS);

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Delete failed for listing {}: {}", id, e);
                ListingsError::PersistenceError(e.to_string())
            })?;

        if row.is_some() {
            log::info!("Deleted listing: {}", id);
        }
        Ok(row.map(ListingRow::into_listing))
    }
}
