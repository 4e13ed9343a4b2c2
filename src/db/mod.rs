// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export store traits and their PostgreSQL implementations

pub mod identity_repository;
pub mod listing_repository;
pub mod review_repository;

pub use identity_repository::*;
pub use listing_repository::*;
pub use review_repository::*;
