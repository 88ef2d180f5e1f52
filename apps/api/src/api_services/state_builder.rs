use std::sync::Arc;

use custos_application::{AccessGuard, AuthorizationCache, AuthorizationService, RoleAdminService};
use custos_core::AppResult;
use custos_infrastructure::InMemoryRoleStore;
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod caches;
mod policy;
mod stores;

/// Application state plus the handles the composition root still needs.
pub struct BuiltState {
    pub app_state: AppState,
    /// In-memory directory, when `ROLE_STORE=memory`; the dev seed writes into it.
    pub memory_store: Option<Arc<InMemoryRoleStore>>,
}

pub async fn build_app_state(pool: Option<PgPool>, config: &ApiConfig) -> AppResult<BuiltState> {
    let stores = stores::build_store_set(pool, config).await?;
    let role_set_cache = caches::build_role_set_cache(config)?;
    let policy = policy::build_policy_source(config, stores.role_store.clone());

    let authorization_service = AuthorizationService::new(
        stores.role_store,
        policy.source,
        AuthorizationCache::new(role_set_cache, config.role_cache_ttl_seconds),
    );

    info!(
        role_store = ?config.role_store,
        role_cache = ?config.role_cache,
        policy_source = ?config.policy_source,
        ttl_seconds = config.role_cache_ttl_seconds,
        "authorization engine configured"
    );

    Ok(BuiltState {
        app_state: AppState {
            access_guard: AccessGuard::new(authorization_service.clone()),
            role_admin_service: RoleAdminService::new(
                stores.role_admin_repository,
                stores.audit_repository,
                authorization_service.clone(),
            ),
            authorization_service,
            policy_matrix: policy.matrix,
            frontend_url: config.frontend_url.clone(),
            bootstrap_token: config.bootstrap_token.clone(),
        },
        memory_store: stores.memory_store,
    })
}
