use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use custos_core::OrganizationId;
use serde::{Deserialize, Serialize};

use crate::{
    CONSULTANT_ROLE, EMPLOYEE_ROLE, MANAGER_ROLE, RoleKey, SUPER_ADMIN_ROLE, TENANT_ADMIN_ROLE,
};

/// Role keys in the order used to pick a principal's primary role.
pub const PRIMARY_ROLE_PRIORITY: &[&str] = &[
    SUPER_ADMIN_ROLE,
    CONSULTANT_ROLE,
    TENANT_ADMIN_ROLE,
    MANAGER_ROLE,
    EMPLOYEE_ROLE,
];

/// One role tuple held by a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRole {
    /// Held role.
    pub role_key: RoleKey,
    /// Display name, when the source provides one.
    pub role_name: Option<String>,
    /// Tenant scope.
    pub company_id: Option<OrganizationId>,
    /// Sub-scope inside the tenant.
    pub location_id: Option<String>,
    /// Expiry of the underlying assignment.
    pub expires_at: Option<DateTime<Utc>>,
    /// Jurisdiction of the role.
    pub country_code: Option<String>,
}

impl ResolvedRole {
    /// Creates an unscoped tuple for a role key.
    #[must_use]
    pub fn new(role_key: RoleKey) -> Self {
        Self {
            role_key,
            role_name: None,
            company_id: None,
            location_id: None,
            expires_at: None,
            country_code: None,
        }
    }

    /// Scopes the tuple to an organization.
    #[must_use]
    pub fn in_organization(mut self, company_id: OrganizationId) -> Self {
        self.company_id = Some(company_id);
        self
    }
}

/// Effective roles of one principal. Derived, never persisted.
///
/// Tuples keep source order and duplicates are dropped on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoleSet {
    roles: Vec<ResolvedRole>,
    source: Option<String>,
}

impl ResolvedRoleSet {
    /// Returns the empty set: the principal holds no authority.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from tuples produced by one named source.
    #[must_use]
    pub fn from_source(source: impl Into<String>, roles: impl IntoIterator<Item = ResolvedRole>) -> Self {
        let mut set = Self {
            roles: Vec::new(),
            source: Some(source.into()),
        };
        for role in roles {
            if !set.roles.contains(&role) {
                set.roles.push(role);
            }
        }

        set
    }

    /// Returns the tuples in source order.
    #[must_use]
    pub fn roles(&self) -> &[ResolvedRole] {
        self.roles.as_slice()
    }

    /// Returns the name of the source that produced the set.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns whether the principal holds no role.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns the number of tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns whether any tuple carries the role key.
    #[must_use]
    pub fn contains_role(&self, role_key: &str) -> bool {
        self.roles.iter().any(|role| role.role_key == *role_key)
    }

    /// Returns whether the principal is a super-admin.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.contains_role(SUPER_ADMIN_ROLE)
    }

    /// Returns the distinct role keys held.
    #[must_use]
    pub fn role_keys(&self) -> BTreeSet<RoleKey> {
        self.roles.iter().map(|role| role.role_key.clone()).collect()
    }

    /// Returns the distinct non-null organization scopes.
    #[must_use]
    pub fn company_ids(&self) -> BTreeSet<OrganizationId> {
        self.roles
            .iter()
            .filter_map(|role| role.company_id.clone())
            .collect()
    }

    /// Returns tuples scoped to one organization.
    pub fn roles_in_organization<'a>(
        &'a self,
        organization_id: &'a OrganizationId,
    ) -> impl Iterator<Item = &'a ResolvedRole> + 'a {
        self.roles
            .iter()
            .filter(move |role| role.company_id.as_ref() == Some(organization_id))
    }

    /// Returns whether the set shares at least one role key with the allow-list.
    #[must_use]
    pub fn intersects(&self, allowed: &[RoleKey]) -> bool {
        allowed.iter().any(|role_key| self.contains_role(role_key.as_str()))
    }

    /// Selects the primary role used for routing and display.
    ///
    /// The first key of [`PRIMARY_ROLE_PRIORITY`] present wins; otherwise the
    /// first tuple's key; `None` for the empty set.
    #[must_use]
    pub fn primary_role(&self) -> Option<&RoleKey> {
        select_primary_role(self.roles.iter())
    }
}

/// Applies the primary-role priority to any sequence of tuples.
pub fn select_primary_role<'a>(
    roles: impl Iterator<Item = &'a ResolvedRole> + Clone,
) -> Option<&'a RoleKey> {
    PRIMARY_ROLE_PRIORITY
        .iter()
        .find_map(|candidate| {
            roles
                .clone()
                .find(|role| role.role_key == **candidate)
                .map(|role| &role.role_key)
        })
        .or_else(|| roles.clone().next().map(|role| &role.role_key))
}
