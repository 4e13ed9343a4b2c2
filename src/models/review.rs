// src/models/review.rs
// DOCUMENTATION: Review records and their display form
// PURPOSE: Reviews read by the aggregator, with authors resolved for display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Identity;

/// Review left on a listing by an identity
/// DOCUMENTATION: Owned by its author; the listing only references it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

/// Review with its author resolved for display
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: Uuid,
    pub author: Option<Identity>,
    pub body: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Attach the resolved author; a dangling reference stays None
    pub fn to_view(&self, author: Option<Identity>) -> ReviewView {
        ReviewView {
            id: self.id,
            author,
            body: self.body.clone(),
            rating: self.rating,
            created_at: self.created_at,
        }
    }
}
