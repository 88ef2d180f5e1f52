//! Custos API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod test_support;

use custos_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, RoleStoreConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let pool = match config.database_url.as_deref() {
        Some(database_url)
            if config.role_store == RoleStoreConfig::Postgres || config.migrate_only =>
        {
            Some(api_services::connect_and_migrate(database_url).await?)
        }
        _ => None,
    };

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let built = api_services::build_app_state(pool.clone(), &config).await?;
    if config.dev_seed
        && let Some(store) = built.memory_store.as_deref()
    {
        dev_seed::run(store).await?;
    }

    let app = match pool {
        Some(pool) => api_router::build_router(
            built.app_state,
            &config.frontend_url,
            api_services::build_postgres_session_layer(pool, config.cookie_secure).await?,
        )?,
        None => api_router::build_router(
            built.app_state,
            &config.frontend_url,
            api_services::build_memory_session_layer(config.cookie_secure),
        )?,
    };

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, "custos api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("API server error: {error}")))
}
