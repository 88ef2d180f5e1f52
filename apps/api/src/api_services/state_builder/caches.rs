use std::sync::Arc;

use custos_application::RoleSetCache;
use custos_core::{AppError, AppResult};
use custos_infrastructure::{InMemoryRoleSetCache, RedisRoleSetCache};

use crate::api_config::{ApiConfig, RoleCacheConfig};
use crate::api_services::redis::build_redis_client;

pub(super) fn build_role_set_cache(config: &ApiConfig) -> AppResult<Arc<dyn RoleSetCache>> {
    match config.role_cache {
        RoleCacheConfig::Memory => Ok(Arc::new(InMemoryRoleSetCache::new())),
        RoleCacheConfig::Redis => {
            let redis_url = config.redis_url.as_deref().ok_or_else(|| {
                AppError::Validation("REDIS_URL is required when ROLE_CACHE=redis".to_owned())
            })?;

            Ok(Arc::new(RedisRoleSetCache::new(
                build_redis_client(redis_url)?,
                config.role_cache_key_prefix.clone(),
            )))
        }
    }
}
