// src/main.rs
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pww_backend::config::Config;
use pww_backend::store::{CatalogStore, MemoryStore, PgStore};
use pww_backend::{bootstrap, build_app, database, state};

const PORT_ATTEMPTS: u16 = 20;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return;
        }
    };

    // Pick the store: PostgreSQL when configured, otherwise in-memory
    let store: Arc<dyn CatalogStore> = match &config.database_url {
        Some(url) => {
            let db_pool = match database::create_pool(url, config.max_connections).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create database pool");
                    return;
                }
            };
            if let Err(e) = database::run_migrations(&db_pool).await {
                tracing::error!(error = %e, "Failed to apply migrations");
                return;
            }
            tracing::info!("Migrations applied");
            Arc::new(PgStore::new(db_pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data lives in memory and is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some(admin) = &config.admin {
        if let Err(e) = bootstrap::ensure_admin(store.as_ref(), admin).await {
            tracing::error!(error = %e, "Failed to bootstrap admin user");
            return;
        }
    }

    // Create application state
    let app_state = state::AppState::new(store, config.jwt.clone());
    let app = build_app(app_state);

    let listener = match bind_with_fallback(config.host, config.port).await {
        Some((listener, addr)) => {
            tracing::info!(%addr, "Server running");
            listener
        }
        None => {
            tracing::error!(host = %config.host, port = config.port, "No free port in range");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}

/// Binds `port`, or the first free port among the next `PORT_ATTEMPTS`.
async fn bind_with_fallback(host: IpAddr, port: u16) -> Option<(TcpListener, SocketAddr)> {
    for offset in 0..=PORT_ATTEMPTS {
        let addr = SocketAddr::from((host, port.saturating_add(offset)));
        match TcpListener::bind(addr).await {
            Ok(listener) => return Some((listener, addr)),
            Err(e) if offset == 0 => tracing::warn!(%addr, error = %e, "Port in use, trying next"),
            Err(_) => {}
        }
    }
    None
}
