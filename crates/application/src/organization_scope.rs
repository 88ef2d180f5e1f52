use std::collections::BTreeSet;
use std::sync::Arc;

use custos_core::{AppResult, OrganizationId};
use custos_domain::ResolvedRoleSet;

use crate::RoleStore;
use crate::authorization_failure::degraded;

/// Computes the organizations a role set may operate within.
#[derive(Clone)]
pub struct OrganizationScopeResolver {
    store: Arc<dyn RoleStore>,
}

impl OrganizationScopeResolver {
    /// Creates a resolver over a role store.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Returns every directory organization for super-admins, otherwise the
    /// distinct organization scopes of the held tuples.
    pub async fn accessible_org_ids(
        &self,
        roles: &ResolvedRoleSet,
    ) -> AppResult<BTreeSet<OrganizationId>> {
        if !roles.is_super_admin() {
            return Ok(roles.company_ids());
        }

        let organizations = self
            .store
            .list_all_organization_ids()
            .await
            .map_err(|error| degraded("organization directory lookup", error))?;

        Ok(organizations.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use custos_domain::{ResolvedRole, ResolvedRoleSet};

    use super::OrganizationScopeResolver;
    use crate::test_support::{FakeRoleStore, organization, role_key};

    fn scoped(key: &str, company: &str) -> ResolvedRole {
        ResolvedRole::new(role_key(key)).in_organization(organization(company))
    }

    fn ids(values: &[&str]) -> BTreeSet<custos_core::OrganizationId> {
        values.iter().map(|value| organization(value)).collect()
    }

    #[tokio::test]
    async fn non_admin_scope_is_the_distinct_company_ids() {
        let resolver = OrganizationScopeResolver::new(Arc::new(
            FakeRoleStore::default().with_organizations(&["org-1", "org-2", "org-7"]),
        ));
        let roles = ResolvedRoleSet::from_source(
            "test",
            [
                scoped("manager", "org-1"),
                scoped("angajat", "org-2"),
                scoped("angajat", "org-1"),
                ResolvedRole::new(role_key("inspector")),
            ],
        );

        let scope = resolver.accessible_org_ids(&roles).await.unwrap_or_default();
        assert_eq!(scope, ids(&["org-1", "org-2"]));
    }

    #[tokio::test]
    async fn super_admin_scope_is_the_whole_directory() {
        let resolver = OrganizationScopeResolver::new(Arc::new(
            FakeRoleStore::default().with_organizations(&["org-1", "org-2", "org-7"]),
        ));
        let roles = ResolvedRoleSet::from_source(
            "test",
            [scoped("super_admin", "org-1"), scoped("manager", "org-99")],
        );

        let scope = resolver.accessible_org_ids(&roles).await.unwrap_or_default();
        assert_eq!(scope, ids(&["org-1", "org-2", "org-7"]));
    }

    #[tokio::test]
    async fn empty_set_has_no_scope() {
        let resolver = OrganizationScopeResolver::new(Arc::new(FakeRoleStore::default()));

        let scope = resolver.accessible_org_ids(&ResolvedRoleSet::empty()).await;
        assert!(matches!(scope, Ok(value) if value.is_empty()));
    }
}
