// src/handlers/listings.rs
// DOCUMENTATION: HTTP handlers for listing operations
// PURPOSE: Parse requests, check identity, call the lifecycle manager

use crate::errors::ListingsError;
use crate::models::{
    to_feature_collection, CreateListingRequest, SearchQuery, SearchResponse,
    UpdateListingRequest,
};
use crate::services::ListingService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Header set by the upstream auth gateway for signed-in users
pub const USER_ID_HEADER: &str = "X-User-Id";

const NO_MATCHES_MESSAGE: &str = "No listings found for the specified city.";

/// Identity of the signed-in caller
fn current_user(req: &HttpRequest) -> Result<Uuid, ListingsError> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(ListingsError::Unauthorized)
}

/// GET /listings
pub async fn index(service: web::Data<ListingService>) -> Result<impl Responder, ListingsError> {
    let listings = service.index().await?;
    Ok(HttpResponse::Ok().json(listings))
}

/// GET /listings/map
/// GeoJSON FeatureCollection of every geocoded listing
pub async fn map(service: web::Data<ListingService>) -> Result<impl Responder, ListingsError> {
    let listings = service.index().await?;
    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .json(to_feature_collection(&listings)))
}

/// POST /listings
pub async fn create_listing(
    service: web::Data<ListingService>,
    req: HttpRequest,
    body: web::Json<CreateListingRequest>,
) -> Result<impl Responder, ListingsError> {
    let owner_id = current_user(&req)?;
    body.validate()?;

    let CreateListingRequest { listing, image } = body.into_inner();
    let created = service.create(listing, owner_id, image).await?;
    Ok(HttpResponse::Created().json(created))
}

/// GET /listings/search?city=
pub async fn search_listings(
    service: web::Data<ListingService>,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, ListingsError> {
    let listings = service.search(query.city.as_deref()).await?;

    let message = listings
        .is_empty()
        .then(|| NO_MATCHES_MESSAGE.to_string());
    Ok(HttpResponse::Ok().json(SearchResponse { listings, message }))
}

/// GET /listings/{id}
pub async fn show_listing(
    service: web::Data<ListingService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ListingsError> {
    let view = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// GET /listings/{id}/edit
pub async fn edit_listing(
    service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ListingsError> {
    let id = path.into_inner();
    service.ensure_owner(id, current_user(&req)?).await?;

    let view = service.edit_view(id).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// PUT /listings/{id}
pub async fn update_listing(
    service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateListingRequest>,
) -> Result<impl Responder, ListingsError> {
    let id = path.into_inner();
    let user_id = current_user(&req)?;
    body.validate()?;
    service.ensure_owner(id, user_id).await?;

    let UpdateListingRequest { listing, image } = body.into_inner();
    let updated = service.update(id, listing, image).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /listings/{id}
pub async fn delete_listing(
    service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ListingsError> {
    let id = path.into_inner();
    service.ensure_owner(id, current_user(&req)?).await?;

    service.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for listing routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/listings")
            .route("", web::get().to(index))
            .route("", web::post().to(create_listing))
            .route("/map", web::get().to(map))
            .route("/search", web::get().to(search_listings))
            .route("/{id}", web::get().to(show_listing))
            .route("/{id}", web::put().to(update_listing))
            .route("/{id}", web::delete().to(delete_listing))
            .route("/{id}/edit", web::get().to(edit_listing)),
    );
}
