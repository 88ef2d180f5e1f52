use std::sync::Arc;

use custos_application::{AuditRepository, RoleAdminRepository, RoleStore};
use custos_core::{AppError, AppResult};
use custos_infrastructure::{
    InMemoryAuditRepository, InMemoryRoleStore, PostgresAuditRepository, PostgresRoleStore,
};
use sqlx::PgPool;

use crate::api_config::{ApiConfig, RoleStoreConfig};

pub(super) struct StoreSet {
    pub role_store: Arc<dyn RoleStore>,
    pub role_admin_repository: Arc<dyn RoleAdminRepository>,
    pub audit_repository: Arc<dyn AuditRepository>,
    pub memory_store: Option<Arc<InMemoryRoleStore>>,
}

pub(super) async fn build_store_set(
    pool: Option<PgPool>,
    config: &ApiConfig,
) -> AppResult<StoreSet> {
    match config.role_store {
        RoleStoreConfig::Postgres => {
            let pool = pool.ok_or_else(|| {
                AppError::Validation(
                    "DATABASE_URL is required when ROLE_STORE=postgres".to_owned(),
                )
            })?;

            let store = Arc::new(PostgresRoleStore::new(pool.clone()));
            store.seed_default_permissions().await?;

            Ok(StoreSet {
                role_store: store.clone(),
                role_admin_repository: store,
                audit_repository: Arc::new(PostgresAuditRepository::new(pool)),
                memory_store: None,
            })
        }
        RoleStoreConfig::Memory => {
            let store = Arc::new(InMemoryRoleStore::with_default_policy());

            Ok(StoreSet {
                role_store: store.clone(),
                role_admin_repository: store.clone(),
                audit_repository: Arc::new(InMemoryAuditRepository::new()),
                memory_store: Some(store),
            })
        }
    }
}
