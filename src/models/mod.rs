// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod identity;
pub mod listing;
pub mod review;

pub use identity::*;
pub use listing::*;
pub use review::*;
