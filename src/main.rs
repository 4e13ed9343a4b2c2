// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, stores, geocoder, and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use db::{PgIdentityStore, PgListingStore, PgReviewStore};
use dotenv::dotenv;
use services::{GeocodeEnricher, ListingService, NominatimClient, ReviewAggregator};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting stayhive-listings service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Geocoding client
    let geocoder = match NominatimClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build geocoding client: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Geocoding via {} (timeout: {}s, {} req/s)",
        config.geocoder_base_url,
        config.geocoder_timeout_secs,
        config.geocoder_requests_per_second
    );

    // 6. Lifecycle manager over the PostgreSQL stores
    let reviews = Arc::new(PgReviewStore::new(pool.clone()));
    let service = ListingService::new(
        Arc::new(PgListingStore::new(pool.clone())),
        reviews.clone(),
        GeocodeEnricher::new(Arc::new(geocoder)),
        ReviewAggregator::new(reviews, Arc::new(PgIdentityStore::new(pool))),
    );
    let service = web::Data::new(service);

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::listings_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
