//! Redis-backed resolved role set cache.

use async_trait::async_trait;
use custos_application::RoleSetCache;
use custos_core::{AppError, AppResult};
use custos_domain::ResolvedRoleSet;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

/// Redis implementation of the role set cache port.
///
/// Entry keys embed an epoch counter; `clear` bumps the epoch so every
/// earlier entry becomes unreachable and expires on its own TTL.
#[derive(Clone)]
pub struct RedisRoleSetCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisRoleSetCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn epoch_key(&self) -> String {
        format!("{}:epoch", self.key_prefix)
    }

    fn key_for(&self, epoch: u64, subject: &str) -> String {
        format!("{}:{epoch}:{subject}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }

    async fn current_epoch(&self, connection: &mut MultiplexedConnection) -> AppResult<u64> {
        let epoch: Option<u64> = connection.get(self.epoch_key()).await.map_err(|error| {
            AppError::Internal(format!("failed to read role set cache epoch: {error}"))
        })?;

        Ok(epoch.unwrap_or_default())
    }

    fn decode_role_set(value: &str) -> AppResult<ResolvedRoleSet> {
        serde_json::from_str(value).map_err(|error| {
            AppError::Internal(format!("invalid role set cache value: {error}"))
        })
    }
}

#[async_trait]
impl RoleSetCache for RedisRoleSetCache {
    async fn get_role_set(&self, subject: &str) -> AppResult<Option<ResolvedRoleSet>> {
        let mut connection = self.connection().await?;
        let epoch = self.current_epoch(&mut connection).await?;

        let encoded: Option<String> = connection
            .get(self.key_for(epoch, subject))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read role set cache entry: {error}"))
            })?;

        encoded.as_deref().map(Self::decode_role_set).transpose()
    }

    async fn set_role_set(
        &self,
        subject: &str,
        roles: &ResolvedRoleSet,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let value = serde_json::to_string(roles).map_err(|error| {
            AppError::Internal(format!("failed to encode role set cache value: {error}"))
        })?;
        let mut connection = self.connection().await?;
        let epoch = self.current_epoch(&mut connection).await?;

        connection
            .set_ex(self.key_for(epoch, subject), value, u64::from(ttl_seconds))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write role set cache entry: {error}"))
            })
    }

    async fn remove_role_set(&self, subject: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let epoch = self.current_epoch(&mut connection).await?;

        connection
            .del(self.key_for(epoch, subject))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to remove role set cache entry: {error}"))
            })
    }

    async fn clear(&self) -> AppResult<()> {
        let mut connection = self.connection().await?;

        let _: u64 = connection.incr(self.epoch_key(), 1_u64).await.map_err(|error| {
            AppError::Internal(format!("failed to advance role set cache epoch: {error}"))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use custos_domain::{ResolvedRole, ResolvedRoleSet, RoleKey};

    use super::RedisRoleSetCache;

    fn cache() -> RedisRoleSetCache {
        let client = redis::Client::open("redis://127.0.0.1/")
            .unwrap_or_else(|error| panic!("invalid redis url: {error}"));
        RedisRoleSetCache::new(client, "custos:roles")
    }

    #[test]
    fn keys_embed_the_epoch() {
        let cache = cache();
        assert_eq!(cache.epoch_key(), "custos:roles:epoch");
        assert_eq!(cache.key_for(3, "mara"), "custos:roles:3:mara");
    }

    #[test]
    fn decodes_encoded_role_sets() {
        let role_key = RoleKey::new("manager").unwrap_or_else(|error| panic!("{error}"));
        let roles = ResolvedRoleSet::from_source("assignments", [ResolvedRole::new(role_key)]);
        let encoded = serde_json::to_string(&roles).unwrap_or_default();

        let decoded = RedisRoleSetCache::decode_role_set(encoded.as_str());
        assert!(matches!(decoded, Ok(ref value) if value == &roles));
        assert!(RedisRoleSetCache::decode_role_set("{not json").is_err());
    }
}
