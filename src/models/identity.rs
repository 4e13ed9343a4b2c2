// src/models/identity.rs
// DOCUMENTATION: Identity profile
// PURPOSE: Public fields of a listing owner or review author

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Public profile of an identity (listing owner or review author)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}
