// src/services/listing_service.rs
// DOCUMENTATION: Listing lifecycle manager
// PURPOSE: Create/read/update/delete/search listings, with best-effort
// geocoding on writes and review aggregation on reads

use crate::db::{ListingFilter, ListingStore, ReviewStore};
use crate::errors::ListingsError;
use crate::models::{
    is_geocodable, EditListingView, Geometry, Listing, ListingChanges, ListingDraft,
    ListingFields, ListingImage, ListingPatch, ListingView,
};
use crate::services::{location_filter, GeocodeEnricher, ReviewAggregator};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingStore>,
    reviews: Arc<dyn ReviewStore>,
    enricher: GeocodeEnricher,
    aggregator: ReviewAggregator,
}

fn not_found(id: Uuid) -> ListingsError {
    log::warn!("Listing not found: {}", id);
    ListingsError::NotFound(id.to_string())
}

impl ListingService {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        reviews: Arc<dyn ReviewStore>,
        enricher: GeocodeEnricher,
        aggregator: ReviewAggregator,
    ) -> Self {
        Self {
            listings,
            reviews,
            enricher,
            aggregator,
        }
    }

    /// Every listing, oldest first
    pub async fn index(&self) -> Result<Vec<Listing>, ListingsError> {
        self.listings.find(&ListingFilter::All).await
    }

    /// Create a listing owned by `owner_id`
    /// DOCUMENTATION: Geocodes before persisting when both location and
    /// country are present; a failed lookup just leaves geometry unset
    pub async fn create(
        &self,
        fields: ListingFields,
        owner_id: Uuid,
        image: ListingImage,
    ) -> Result<Listing, ListingsError> {
        let geometry = self.geometry_for(&fields.location, &fields.country).await;

        let draft = ListingDraft {
            fields,
            image,
            geometry,
            owner_id,
        };

        self.listings.insert(&draft).await
    }

    /// Fetch a listing with owner, reviews and review authors resolved
    pub async fn get(&self, id: Uuid) -> Result<ListingView, ListingsError> {
        let listing = self.find(id).await?;
        self.aggregator.attach_reviews(listing).await
    }

    /// Bare record, no population
    pub async fn find(&self, id: Uuid) -> Result<Listing, ListingsError> {
        self.listings
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Record plus the resized preview shown on the edit form
    pub async fn edit_view(&self, id: Uuid) -> Result<EditListingView, ListingsError> {
        let listing = self.find(id).await?;
        let original_image_url = listing.image.thumbnail_url();

        Ok(EditListingView {
            listing,
            original_image_url,
        })
    }

    /// Fetch a listing and check that `user_id` owns it
    pub async fn ensure_owner(&self, id: Uuid, user_id: Uuid) -> Result<Listing, ListingsError> {
        let listing = self.find(id).await?;

        if listing.owner_id != user_id {
            log::warn!("User {} attempted to modify listing {} they do not own", user_id, id);
            return Err(ListingsError::Forbidden(
                "You are not the owner of this listing".to_string(),
            ));
        }

        Ok(listing)
    }

    /// Patch a listing, optionally swap its image, then re-geocode
    /// DOCUMENTATION: Up to three separate writes, in this order:
    /// 1. allow-listed field patch (skipped when the patch is empty)
    /// 2. new image, if one was uploaded
    /// 3. refreshed geometry, if location and country are set and the lookup
    ///    succeeded
    /// Geocoding runs on every update even when location/country did not
    /// change. A failed lookup keeps the previous geometry.
    pub async fn update(
        &self,
        id: Uuid,
        patch: ListingPatch,
        image: Option<ListingImage>,
    ) -> Result<Listing, ListingsError> {
        let mut listing = if patch.is_empty() {
            self.find(id).await?
        } else {
            self.write(id, ListingChanges::fields(patch)).await?
        };

        if let Some(image) = image {
            listing = self.write(id, ListingChanges::image(image)).await?;
            log::info!("Replaced image for listing {}", id);
        }

        if let Some(geometry) = self.geometry_for(&listing.location, &listing.country).await {
            listing = self.write(id, ListingChanges::geometry(geometry)).await?;
        }

        log::info!("Updated listing: {}", id);
        Ok(listing)
    }

    /// Delete a listing and the reviews attached to it
    /// DOCUMENTATION: Reviews go first, so a failed review delete leaves the
    /// listing in place and the call can be retried
    pub async fn delete(&self, id: Uuid) -> Result<(), ListingsError> {
        self.find(id).await?;

        let removed = self.reviews.delete_for_listing(id).await?;

        self.listings
            .delete_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        log::info!("Deleted listing {} and {} review(s)", id, removed);
        Ok(())
    }

    /// Listings whose location matches the city query
    /// DOCUMENTATION: Ok(empty) means no matches; SearchError means the
    /// query itself could not be evaluated
    pub async fn search(&self, city: Option<&str>) -> Result<Vec<Listing>, ListingsError> {
        let filter = location_filter(city)?;
        let listings = self.listings.find(&filter).await?;

        log::info!(
            "Search for '{}' matched {} listing(s)",
            city.unwrap_or_default().trim(),
            listings.len()
        );
        Ok(listings)
    }

    async fn write(&self, id: Uuid, changes: ListingChanges) -> Result<Listing, ListingsError> {
        self.listings
            .update_by_id(id, &changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn geometry_for(&self, location: &str, country: &str) -> Option<Geometry> {
        if !is_geocodable(location, country) {
            return None;
        }

        self.enricher
            .enrich(location, country)
            .await
            .and_then(Geometry::from_coordinates)
    }
}
