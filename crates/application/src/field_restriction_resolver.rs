use std::sync::Arc;

use custos_core::AppResult;
use custos_domain::{FieldRestrictions, ResolvedRoleSet, Resource};

use crate::RoleStore;
use crate::authorization_failure::degraded;

/// Computes per-field visibility for a settled role set.
#[derive(Clone)]
pub struct FieldRestrictionResolver {
    store: Arc<dyn RoleStore>,
}

impl FieldRestrictionResolver {
    /// Creates a resolver over a role store.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Merges the restrictions of every active permission the roles hold on the resource.
    ///
    /// Super-admins and empty sets get no restrictions. Resource-level access
    /// is decided separately by the permission evaluator.
    pub async fn restrictions(
        &self,
        roles: &ResolvedRoleSet,
        resource: Resource,
    ) -> AppResult<FieldRestrictions> {
        if roles.is_super_admin() || roles.is_empty() {
            return Ok(FieldRestrictions::unrestricted());
        }

        let role_keys = roles.role_keys();
        let grants = self
            .store
            .list_active_permissions(resource, None)
            .await
            .map_err(|error| degraded(format_args!("field restrictions for {resource}"), error))?;

        Ok(FieldRestrictions::merge(
            grants
                .iter()
                .filter(|grant| role_keys.contains(&grant.role_key))
                .map(|grant| &grant.field_restrictions),
        ))
    }
}
