use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod lockout;
mod models;
mod password;
mod repositories;
mod routes;
mod service;
mod validation;

use common::database;
use common::token::{TokenConfig, TokenService};
use std::sync::Arc;

use crate::lockout::LockoutConfig;
use crate::repositories::PgCredentialStore;
use crate::service::Authenticator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting authentication service");

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
    let lockout_config = LockoutConfig::from_env();

    let store = Arc::new(PgCredentialStore::new(pool));
    let authenticator = Authenticator::new(store, lockout_config, token_service);

    info!("Authentication service initialized successfully");

    let app_state = AppState { authenticator };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Authentication service listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
