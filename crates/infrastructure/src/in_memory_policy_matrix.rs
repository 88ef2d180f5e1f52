use std::collections::BTreeSet;

use async_trait::async_trait;
use custos_application::PolicySource;
use custos_core::AppResult;
use custos_domain::{Action, PermissionRecord, Resource, RoleKey, policy_matrix};
use tokio::sync::RwLock;
use tracing::info;

type Grant = (RoleKey, Resource, Action);

/// Runtime-updatable role × resource × action policy held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPolicyMatrix {
    grants: RwLock<BTreeSet<Grant>>,
}

impl InMemoryPolicyMatrix {
    /// Builds a matrix from the active records.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PermissionRecord>) -> Self {
        let grants = records
            .into_iter()
            .filter(|record| record.is_active)
            .map(|record| (record.role_key.clone(), record.resource, record.action))
            .collect();

        Self {
            grants: RwLock::new(grants),
        }
    }

    /// Builds a matrix from the platform's default policy.
    #[must_use]
    pub fn with_default_policy() -> Self {
        Self::from_records(policy_matrix::default_permissions().iter())
    }

    /// Grants the action on the resource to the role. Returns whether it was newly granted.
    pub async fn grant(&self, role_key: RoleKey, resource: Resource, action: Action) -> bool {
        let granted = self
            .grants
            .write()
            .await
            .insert((role_key.clone(), resource, action));
        if granted {
            info!(role_key = %role_key, %resource, %action, "policy grant added");
        }
        granted
    }

    /// Revokes the action on the resource from the role. Returns whether a grant was removed.
    pub async fn revoke(&self, role_key: &RoleKey, resource: Resource, action: Action) -> bool {
        let revoked = self
            .grants
            .write()
            .await
            .remove(&(role_key.clone(), resource, action));
        if revoked {
            info!(role_key = %role_key, %resource, %action, "policy grant revoked");
        }
        revoked
    }

    /// Applies a permission record: active records grant, inactive ones revoke.
    pub async fn apply(&self, record: &PermissionRecord) {
        if record.is_active {
            self.grant(record.role_key.clone(), record.resource, record.action)
                .await;
        } else {
            self.revoke(&record.role_key, record.resource, record.action)
                .await;
        }
    }
}

#[async_trait]
impl PolicySource for InMemoryPolicyMatrix {
    async fn lookup(
        &self,
        role_key: &RoleKey,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        Ok(self
            .grants
            .read()
            .await
            .contains(&(role_key.clone(), resource, action)))
    }

    async fn lookup_any(
        &self,
        role_keys: &BTreeSet<RoleKey>,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        let grants = self.grants.read().await;
        Ok(role_keys
            .iter()
            .any(|role_key| grants.contains(&(role_key.clone(), resource, action))))
    }
}
