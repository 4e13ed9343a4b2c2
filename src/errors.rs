// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the listings service

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Outcomes that cross the listing core boundary
/// DOCUMENTATION: Geocoding problems never appear here; the enrichment
/// adapter absorbs them before they reach the lifecycle manager.
/// Each variant maps to an HTTP status code and a JSON error envelope.
#[derive(Error, Debug)]
pub enum ListingsError {
    #[error("Listing not found with id: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access: {0}")]
    Forbidden(String),
}

impl ListingsError {
    fn error_code(&self) -> &'static str {
        match self {
            ListingsError::NotFound(_) => "NOT_FOUND",
            ListingsError::ValidationError(_) => "VALIDATION_ERROR",
            ListingsError::SearchError(_) => "SEARCH_ERROR",
            ListingsError::PersistenceError(_) => "PERSISTENCE_ERROR",
            ListingsError::Unauthorized => "UNAUTHORIZED",
            ListingsError::Forbidden(_) => "FORBIDDEN",
        }
    }
}

impl From<validator::ValidationErrors> for ListingsError {
    fn from(e: validator::ValidationErrors) -> Self {
        ListingsError::ValidationError(e.to_string())
    }
}

/// Convert ListingsError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for ListingsError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ListingsError::NotFound(_) => StatusCode::NOT_FOUND,
            ListingsError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ListingsError::SearchError(_) => StatusCode::BAD_REQUEST,
            ListingsError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ListingsError::Unauthorized => StatusCode::UNAUTHORIZED,
            ListingsError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}
