// src/models/listing.rs
// DOCUMENTATION: Core data structures for listings
// PURPOSE: Domain records, request DTOs and display views for rental listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Identity, ReviewView};

/// Reference to externally stored media
/// DOCUMENTATION: Produced by upload storage; opaque to the listing core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ListingImage {
    #[validate(length(min = 1))]
    pub url: String,

    #[validate(length(min = 1))]
    pub filename: String,
}

impl ListingImage {
    /// Resized preview used by the edit form (CDN width transform)
    pub fn thumbnail_url(&self) -> String {
        self.url.replacen("/upload", "/upload/w_250", 1)
    }
}

/// Coordinate pair returned by a successful geocoding lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

/// GeoJSON-style point attached to a listing
/// DOCUMENTATION: coordinates are [longitude, latitude], both finite.
/// Constructors refuse anything else, so a Geometry in hand is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: GeometryType,

    pub coordinates: [f64; 2],
}

impl Geometry {
    /// Build a point from longitude/latitude, rejecting non-finite values
    pub fn point(longitude: f64, latitude: f64) -> Option<Self> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }

        Some(Geometry {
            kind: GeometryType::Point,
            coordinates: [longitude, latitude],
        })
    }

    /// Reorder a geocoded (lat, lon) pair into [lon, lat]
    pub fn from_coordinates(c: Coordinates) -> Option<Self> {
        Self::point(c.longitude, c.latitude)
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn to_point(&self) -> geo_types::Point<f64> {
        geo_types::Point::new(self.longitude(), self.latitude())
    }
}

impl From<&Geometry> for geojson::Geometry {
    fn from(g: &Geometry) -> Self {
        geojson::Geometry::new(geojson::Value::from(&g.to_point()))
    }
}

/// Represents a complete listing record
/// DOCUMENTATION: Maps to the listings table; `owner_id` is fixed at creation
/// and `geometry` is present only after a successful enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub country: String,
    pub image: ListingImage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Both halves of the geocoding query key are present
pub fn is_geocodable(location: &str, country: &str) -> bool {
    !location.trim().is_empty() && !country.trim().is_empty()
}

/// Caller-supplied scalar fields of a listing
/// DOCUMENTATION: Validated by the request layer before the lifecycle
/// manager sees them
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListingFields {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub description: String,

    #[validate(range(min = 0.0))]
    pub price: f64,

    #[validate(length(min = 1))]
    pub location: String,

    #[validate(length(min = 1))]
    pub country: String,
}

/// Request DTO for POST /listings
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate]
    pub listing: ListingFields,

    #[validate]
    pub image: ListingImage,
}

/// Allow-listed fields an update may touch
/// DOCUMENTATION: owner, id and image are deliberately absent;
/// unknown keys are rejected at deserialization
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ListingPatch {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(length(min = 1))]
    pub location: Option<String>,

    #[validate(length(min = 1))]
    pub country: Option<String>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.location.is_none()
            && self.country.is_none()
    }
}

/// Request DTO for PUT /listings/{id}
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[serde(default)]
    #[validate]
    pub listing: ListingPatch,

    #[validate]
    pub image: Option<ListingImage>,
}

/// Record handed to the store on insert
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub fields: ListingFields,
    pub image: ListingImage,
    pub geometry: Option<Geometry>,
    pub owner_id: Uuid,
}

/// Store-level update; every None leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    pub fields: ListingPatch,
    pub image: Option<ListingImage>,
    pub geometry: Option<Geometry>,
}

impl ListingChanges {
    pub fn fields(patch: ListingPatch) -> Self {
        ListingChanges {
            fields: patch,
            ..Default::default()
        }
    }

    pub fn image(image: ListingImage) -> Self {
        ListingChanges {
            image: Some(image),
            ..Default::default()
        }
    }

    pub fn geometry(geometry: Geometry) -> Self {
        ListingChanges {
            geometry: Some(geometry),
            ..Default::default()
        }
    }
}

/// Display-ready listing with owner and reviews resolved
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub owner: Option<Identity>,
    pub reviews: Vec<ReviewView>,
}

/// Response for GET /listings/{id}/edit
#[derive(Debug, Serialize)]
pub struct EditListingView {
    pub listing: Listing,
    pub original_image_url: String,
}

/// Search query parameters for GET /listings/search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub city: Option<String>,
}

/// Search results; an empty list carries a message instead of an error
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub listings: Vec<Listing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Build a GeoJSON FeatureCollection for the listings that carry a geometry
pub fn to_feature_collection(listings: &[Listing]) -> geojson::FeatureCollection {
    let features = listings
        .iter()
        .filter_map(|listing| {
            let geometry = listing.geometry.as_ref()?;
            let mut properties = serde_json::Map::new();
            properties.insert("id".to_string(), listing.id.to_string().into());
            properties.insert("title".to_string(), listing.title.clone().into());
            properties.insert("location".to_string(), listing.location.clone().into());
            properties.insert("price".to_string(), listing.price.into());

            Some(geojson::Feature {
                bbox: None,
                geometry: Some(geometry.into()),
                id: Some(geojson::feature::Id::String(listing.id.to_string())),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
