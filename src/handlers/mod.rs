// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod health;
pub mod listings;

pub use health::config as health_config;
pub use listings::config as listings_config;
