use std::collections::BTreeSet;

use async_trait::async_trait;
use custos_core::AppResult;
use custos_domain::{Action, Resource, RoleKey};

/// Queryable role × resource × action policy.
#[async_trait]
pub trait PolicySource: Send + Sync {
    /// Returns whether the role is granted the action on the resource.
    async fn lookup(&self, role_key: &RoleKey, resource: Resource, action: Action)
    -> AppResult<bool>;

    /// Returns whether any of the roles is granted the action on the resource.
    async fn lookup_any(
        &self,
        role_keys: &BTreeSet<RoleKey>,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        for role_key in role_keys {
            if self.lookup(role_key, resource, action).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
