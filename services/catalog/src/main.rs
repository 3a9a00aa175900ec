use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use catalog::{
    AppState,
    config::{AppConfig, StorageBackend},
    password::CredentialManager,
    repositories::{PgGameRepository, PgUserRepository, run_migrations},
    routes,
    session::RedisSessionStore,
};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig, init_pool},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting catalog service");

    let config = AppConfig::from_env()?;

    let app_state = match config.storage {
        StorageBackend::Postgres => build_postgres_state(&config).await?,
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on restart");
            AppState::in_memory(&config)?
        }
    };

    info!("Catalog service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Catalog service listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Catalog service stopped");
    Ok(())
}

async fn build_postgres_state(config: &AppConfig) -> Result<AppState> {
    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    if !redis_pool.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    let credentials = CredentialManager::new(config.hashing_cost())?;

    Ok(AppState::new(
        Arc::new(PgGameRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(RedisSessionStore::new(redis_pool)),
        credentials,
        config,
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
