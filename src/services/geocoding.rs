// src/services/geocoding.rs
// DOCUMENTATION: Geocoding client and best-effort enrichment adapter
// PURPOSE: Turn free-text location + country into coordinates without ever
// failing the operation that asked

use crate::config::Config;
use crate::models::Coordinates;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Every way a lookup can fail
/// DOCUMENTATION: Never leaves this module's adapter; GeocodeEnricher turns
/// it into `None` plus a warning
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("service answered {0}")]
    Status(StatusCode),

    #[error("no candidates returned")]
    NoResults,

    #[error("unusable coordinates lat={lat:?} lon={lon:?}")]
    InvalidCoordinates { lat: String, lon: String },
}

/// Outbound geocoding lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError>;
}

/// Candidate from a Nominatim `/search?format=json` response
/// DOCUMENTATION: lat/lon arrive as numeric strings
#[derive(Debug, Deserialize)]
struct NominatimCandidate {
    lat: String,
    lon: String,
}

impl NominatimCandidate {
    fn coordinates(&self) -> Result<Coordinates, GeocodeError> {
        let invalid = || GeocodeError::InvalidCoordinates {
            lat: self.lat.clone(),
            lon: self.lon.clone(),
        };

        let latitude: f64 = self.lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = self.lon.trim().parse().map_err(|_| invalid())?;

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }

        Ok(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Nominatim (OpenStreetMap) geocoding client
/// DOCUMENTATION: One GET per lookup, identified by a descriptive User-Agent
/// as the service's usage policy asks. The whole lookup, including the wait
/// for a rate-limit permit, is bounded by `timeout`.
pub struct NominatimClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    limiter: Arc<DirectRateLimiter>,
}

impl NominatimClient {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GeocodeError> {
        Self::new(
            &config.geocoder_base_url,
            &config.geocoder_user_agent,
            Duration::from_secs(config.geocoder_timeout_secs),
            config.geocoder_requests_per_second,
        )
    }

    async fn lookup(&self, query: &str) -> Result<Coordinates, GeocodeError> {
        self.limiter.until_ready().await;

        let url = format!("{}/search", self.base_url);
        log::debug!("Geocoding lookup: q={}", query);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let candidates: Vec<NominatimCandidate> = response.json().await?;
        candidates
            .first()
            .ok_or(GeocodeError::NoResults)?
            .coordinates()
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError> {
        // Dropping the caller's future drops the in-flight request with it
        tokio::time::timeout(self.timeout, self.lookup(query))
            .await
            .map_err(|_| GeocodeError::Timeout(self.timeout))?
    }
}

/// Best-effort enrichment adapter used by the lifecycle manager
#[derive(Clone)]
pub struct GeocodeEnricher {
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodeEnricher {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Look up `"<location>, <country>"`; any failure yields None
    pub async fn enrich(&self, location: &str, country: &str) -> Option<Coordinates> {
        let query = format!("{}, {}", location, country);

        match self.geocoder.geocode(&query).await {
            Ok(coordinates) => {
                log::debug!(
                    "Geocoded '{}' -> ({}, {})",
                    query,
                    coordinates.latitude,
                    coordinates.longitude
                );
                Some(coordinates)
            }
            Err(e) => {
                log::warn!("Geocoding '{}' failed, continuing without geometry: {}", query, e);
                None
            }
        }
    }
}
