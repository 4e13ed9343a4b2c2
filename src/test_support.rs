// src/test_support.rs
// DOCUMENTATION: In-memory collaborators and fixtures for unit tests
// PURPOSE: Drive the listing core without PostgreSQL or the network

use crate::db::{IdentityStore, ListingFilter, ListingStore, ReviewStore};
use crate::errors::ListingsError;
use crate::models::{
    Coordinates, Identity, Listing, ListingChanges, ListingDraft, ListingFields, ListingImage,
    Review,
};
use crate::services::{GeocodeEnricher, GeocodeError, Geocoder, ListingService, ReviewAggregator};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

// =============================================================================
// Fixtures
// =============================================================================

pub fn identity(username: &str) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{}@stayhive.test", username),
    }
}

pub fn image(url: &str) -> ListingImage {
    ListingImage {
        url: url.to_string(),
        filename: url.rsplit('/').next().unwrap_or(url).to_string(),
    }
}

pub fn fields(location: &str, country: &str) -> ListingFields {
    ListingFields {
        title: format!("Stay in {}", location),
        description: "Cosy place".to_string(),
        price: 100.0,
        location: location.to_string(),
        country: country.to_string(),
    }
}

pub fn listing(location: &str, country: &str, owner_id: Uuid) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        title: format!("Stay in {}", location),
        description: "Cosy place".to_string(),
        price: 100.0,
        location: location.to_string(),
        country: country.to_string(),
        image: image("https://cdn.test/upload/a.jpg"),
        geometry: None,
        owner_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Review created `minutes` after a fixed epoch
pub fn review(listing_id: Uuid, author_id: Uuid, body: &str, minutes: i64) -> Review {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Review {
        id: Uuid::new_v4(),
        listing_id,
        author_id,
        body: body.to_string(),
        rating: 4,
        created_at: base + ChronoDuration::minutes(minutes),
    }
}

// =============================================================================
// Stores
// =============================================================================

#[derive(Default)]
pub struct MemoryListingStore {
    listings: Mutex<Vec<Listing>>,
    updates: AtomicUsize,
}

impl MemoryListingStore {
    pub fn with(listings: Vec<Listing>) -> Self {
        Self {
            listings: Mutex::new(listings),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Listing> {
        self.listings.lock().unwrap().iter().find(|l| l.id == id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

fn apply(listing: &mut Listing, changes: &ListingChanges) {
    let patch = &changes.fields;
    if let Some(title) = &patch.title {
        listing.title = title.clone();
    }
    if let Some(description) = &patch.description {
        listing.description = description.clone();
    }
    if let Some(price) = patch.price {
        listing.price = price;
    }
    if let Some(location) = &patch.location {
        listing.location = location.clone();
    }
    if let Some(country) = &patch.country {
        listing.country = country.clone();
    }
    if let Some(image) = &changes.image {
        listing.image = image.clone();
    }
    if let Some(geometry) = changes.geometry {
        listing.geometry = Some(geometry);
    }
    listing.updated_at = Utc::now();
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn find(&self, filter: &ListingFilter) -> Result<Vec<Listing>, ListingsError> {
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>, ListingsError> {
        Ok(self.get(id))
    }

    async fn insert(&self, draft: &ListingDraft) -> Result<Listing, ListingsError> {
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            title: draft.fields.title.clone(),
            description: draft.fields.description.clone(),
            price: draft.fields.price,
            location: draft.fields.location.clone(),
            country: draft.fields.country.clone(),
            image: draft.image.clone(),
            geometry: draft.geometry,
            owner_id: draft.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.listings.lock().unwrap().push(listing.clone());
        Ok(listing)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        changes: &ListingChanges,
    ) -> Result<Option<Listing>, ListingsError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut listings = self.listings.lock().unwrap();
        Ok(listings.iter_mut().find(|l| l.id == id).map(|listing| {
            apply(listing, changes);
            listing.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Listing>, ListingsError> {
        let mut listings = self.listings.lock().unwrap();
        let position = listings.iter().position(|l| l.id == id);
        Ok(position.map(|i| listings.remove(i)))
    }
}

/// Store whose backend is unreachable
pub struct UnreachableListingStore;

fn unreachable_store() -> ListingsError {
    ListingsError::PersistenceError("connection refused".to_string())
}

#[async_trait]
impl ListingStore for UnreachableListingStore {
    async fn find(&self, _filter: &ListingFilter) -> Result<Vec<Listing>, ListingsError> {
        Err(unreachable_store())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Listing>, ListingsError> {
        Err(unreachable_store())
    }

    async fn insert(&self, _draft: &ListingDraft) -> Result<Listing, ListingsError> {
        Err(unreachable_store())
    }

    async fn update_by_id(
        &self,
        _id: Uuid,
        _changes: &ListingChanges,
    ) -> Result<Option<Listing>, ListingsError> {
        Err(unreachable_store())
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<Option<Listing>, ListingsError> {
        Err(unreachable_store())
    }
}

#[derive(Default)]
pub struct MemoryReviewStore {
    reviews: Mutex<Vec<Review>>,
}

impl MemoryReviewStore {
    pub fn add(&self, review: Review) {
        self.reviews.lock().unwrap().push(review);
    }

    pub fn count_for(&self, listing_id: Uuid) -> usize {
        self.reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.listing_id == listing_id)
            .count()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn reviews_for_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, ListingsError> {
        let mut reviews: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.listing_id == listing_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.created_at);
        Ok(reviews)
    }

    async fn delete_for_listing(&self, listing_id: Uuid) -> Result<u64, ListingsError> {
        let mut reviews = self.reviews.lock().unwrap();
        let before = reviews.len();
        reviews.retain(|r| r.listing_id != listing_id);
        Ok((before - reviews.len()) as u64)
    }
}

/// Review store whose backend is unreachable
pub struct UnreachableReviewStore;

#[async_trait]
impl ReviewStore for UnreachableReviewStore {
    async fn reviews_for_listing(&self, _listing_id: Uuid) -> Result<Vec<Review>, ListingsError> {
        Err(unreachable_store())
    }

    async fn delete_for_listing(&self, _listing_id: Uuid) -> Result<u64, ListingsError> {
        Err(unreachable_store())
    }
}

#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: Vec<Identity>,
    batch_calls: AtomicUsize,
}

impl MemoryIdentityStore {
    pub fn with(identities: Vec<Identity>) -> Self {
        Self {
            identities,
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Identity>, ListingsError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .identities
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Geocoder
// =============================================================================

/// Deterministic geocoder that records every query it sees
pub struct StubGeocoder {
    answer: Option<Coordinates>,
    queries: Mutex<Vec<String>>,
}

impl StubGeocoder {
    pub fn found(latitude: f64, longitude: f64) -> Self {
        Self {
            answer: Some(Coordinates {
                latitude,
                longitude,
            }),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            answer: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.answer
            .ok_or(GeocodeError::Timeout(Duration::from_secs(5)))
    }
}

// =============================================================================
// Wiring
// =============================================================================

pub struct Harness {
    pub service: ListingService,
    pub listings: Arc<MemoryListingStore>,
    pub reviews: Arc<MemoryReviewStore>,
    pub geocoder: Arc<StubGeocoder>,
}

pub fn harness(geocoder: StubGeocoder, identities: Vec<Identity>) -> Harness {
    let listings = Arc::new(MemoryListingStore::default());
    let reviews = Arc::new(MemoryReviewStore::default());
    let geocoder = Arc::new(geocoder);

    let service = ListingService::new(
        listings.clone(),
        reviews.clone(),
        GeocodeEnricher::new(geocoder.clone()),
        ReviewAggregator::new(
            reviews.clone(),
            Arc::new(MemoryIdentityStore::with(identities)),
        ),
    );

    Harness {
        service,
        listings,
        reviews,
        geocoder,
    }
}
