use async_trait::async_trait;
use custos_core::AppResult;
use custos_domain::ResolvedRole;

/// One ranked provider of role tuples for a principal.
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Stable source name recorded on the resolved set.
    fn name(&self) -> &'static str;

    /// Loads the tuples this source grants. An empty result defers to the next source.
    async fn load_roles(&self, subject: &str) -> AppResult<Vec<ResolvedRole>>;
}
