use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use custos_core::AppResult;
use custos_domain::{Action, ResolvedRoleSet, Resource, RoleKey};

use crate::authorization_failure::degraded;
use crate::{PolicySource, RoleStore};

/// Policy source backed by the persisted permission table.
#[derive(Clone)]
pub struct StorePolicySource {
    store: Arc<dyn RoleStore>,
}

impl StorePolicySource {
    /// Creates a policy source over a role store.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PolicySource for StorePolicySource {
    async fn lookup(
        &self,
        role_key: &RoleKey,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        self.lookup_any(&BTreeSet::from([role_key.clone()]), resource, action)
            .await
    }

    async fn lookup_any(
        &self,
        role_keys: &BTreeSet<RoleKey>,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        let grants = self
            .store
            .list_active_permissions(resource, Some(action))
            .await?;

        Ok(grants
            .iter()
            .any(|grant| role_keys.contains(&grant.role_key)))
    }
}

/// Answers resource/action questions for a settled role set.
#[derive(Clone)]
pub struct PermissionEvaluator {
    policy: Arc<dyn PolicySource>,
}

impl PermissionEvaluator {
    /// Creates an evaluator over a policy source.
    #[must_use]
    pub fn new(policy: Arc<dyn PolicySource>) -> Self {
        Self { policy }
    }

    /// Returns whether the role set may perform the action on the resource.
    ///
    /// `super_admin` bypasses the policy entirely and an empty set is denied
    /// without a lookup.
    pub async fn can_perform(
        &self,
        roles: &ResolvedRoleSet,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        if roles.is_super_admin() {
            return Ok(true);
        }

        if roles.is_empty() {
            return Ok(false);
        }

        self.policy
            .lookup_any(&roles.role_keys(), resource, action)
            .await
            .map_err(|error| {
                degraded(
                    format_args!("policy lookup for {}.{}", resource, action),
                    error,
                )
            })
    }
}
