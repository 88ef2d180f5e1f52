use async_trait::async_trait;
use custos_core::AppResult;
use custos_domain::ResolvedRoleSet;

/// Storage port for resolved role sets with ttl.
#[async_trait]
pub trait RoleSetCache: Send + Sync {
    /// Returns the cached set for a principal, if present and not expired.
    async fn get_role_set(&self, subject: &str) -> AppResult<Option<ResolvedRoleSet>>;

    /// Stores a principal's set with ttl.
    async fn set_role_set(
        &self,
        subject: &str,
        roles: &ResolvedRoleSet,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops a principal's entry.
    async fn remove_role_set(&self, subject: &str) -> AppResult<()>;

    /// Drops every entry.
    async fn clear(&self) -> AppResult<()>;
}
