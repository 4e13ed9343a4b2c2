// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod geocoding;
pub mod listing_service;
pub mod review_aggregator;
pub mod search;

pub use geocoding::*;
pub use listing_service::*;
pub use review_aggregator::*;
pub use search::*;
