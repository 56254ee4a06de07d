use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod middleware;
mod models;
mod pricing;
mod repositories;
mod routes;
mod service;
mod state;

use common::database;
use common::token::{TokenConfig, TokenService};
use std::sync::Arc;

use crate::pricing::PricingConfig;
use crate::repositories::{PgBookingStore, PgListingStore};
use crate::service::ReservationEngine;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting booking service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Configuration is built once here and passed into the components;
    // nothing reads the environment after startup.
    let token_config = TokenConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let token_service = TokenService::new(&token_config);
    let pricing_config = PricingConfig::from_env();

    let engine = ReservationEngine::new(
        Arc::new(PgListingStore::new(pool.clone())),
        Arc::new(PgBookingStore::new(pool)),
        pricing_config,
    );

    info!("Booking service initialized successfully");

    let app_state = AppState {
        engine,
        token_service,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    info!("Booking service listening on 0.0.0.0:3001");

    axum::serve(listener, app).await?;

    Ok(())
}
