//! Parky API Server
//!
//! REST API server for national parks and trails.

use anyhow::Context;
use parky_api::auth::{InMemoryUserRepository, PgUserRepository, UserRepository};
use parky_api::{create_router, state::AppState};
use parky_core::{
    AppConfig, LoggingConfig, MemoryStore, ParkRepository, PgStore, StorageBackend,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "parky_api={level},parky_core={level},tower_http={level},audit=info",
            level = logging.level
        ))
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("PARKY_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

async fn open_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn UserRepository>, Arc<dyn ParkRepository>)> {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Ok((
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(MemoryStore::new()),
            ))
        }
        StorageBackend::Postgres => {
            let parks = PgStore::connect(&config.database)
                .await
                .context("connecting to PostgreSQL")?;
            parks.init_schema().await?;

            let users = PgUserRepository::new(parks.pool().clone());
            users.init_schema().await?;

            tracing::info!(pool_size = config.database.pool_size, "connected to PostgreSQL");
            Ok((Arc::new(users), Arc::new(parks)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    if config.uses_development_secret() {
        tracing::warn!(
            "JWT_SECRET not set; using the development signing secret with in-memory storage"
        );
    }

    let (users, parks) = open_stores(&config).await?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let bootstrap_admin = config.auth.bootstrap_admin.clone();

    let state = Arc::new(AppState::new(config, users, parks)?);

    if let Some(admin) = bootstrap_admin {
        state
            .authenticator
            .ensure_admin(&admin)
            .await
            .context("creating bootstrap admin")?;
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Parky API Server starting on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
