use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use custos_application::{
    AssignRoleInput, RevokeRoleInput, RoleAdminRepository, RoleStore, UpdateRoleInput,
};
use custos_core::{AppError, AppResult, OrganizationId};
use custos_domain::{
    Action, MembershipRecord, PermissionGrant, PermissionRecord, Resource, Role,
    RoleAssignmentRecord, RoleKey, policy_matrix,
};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredAssignment {
    subject: String,
    role_key: RoleKey,
    company_id: Option<OrganizationId>,
    location_id: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
}

#[derive(Debug, Default)]
struct DirectoryState {
    organizations: BTreeSet<OrganizationId>,
    roles: BTreeMap<RoleKey, Role>,
    permissions: BTreeMap<(RoleKey, Resource, Action), PermissionRecord>,
    // Insertion order stands in for `created_at`.
    assignments: Vec<StoredAssignment>,
    memberships: BTreeMap<(String, OrganizationId), MembershipRecord>,
}

impl DirectoryState {
    fn role(&self, role_key: &RoleKey) -> AppResult<&Role> {
        self.roles.get(role_key).ok_or_else(|| {
            AppError::Configuration(format!("permission references missing role '{role_key}'"))
        })
    }
}

/// In-memory role store and role administration repository.
///
/// Mirrors the PostgreSQL adapter's filtering and ordering so both can back
/// the same services.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    state: RwLock<DirectoryState>,
}

impl InMemoryRoleStore {
    /// Creates an empty store without roles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the system roles and the default permission matrix.
    #[must_use]
    pub fn with_default_policy() -> Self {
        let roles = policy_matrix::system_roles()
            .into_iter()
            .map(|role| (role.role_key.clone(), role))
            .collect();
        let permissions = policy_matrix::default_permissions()
            .into_iter()
            .map(|record| {
                (
                    (record.role_key.clone(), record.resource, record.action),
                    record,
                )
            })
            .collect();

        Self {
            state: RwLock::new(DirectoryState {
                roles,
                permissions,
                ..DirectoryState::default()
            }),
        }
    }

    /// Adds an organization to the tenant directory.
    pub async fn add_organization(&self, organization_id: OrganizationId) {
        self.state.write().await.organizations.insert(organization_id);
    }

    /// Adds or replaces a role definition.
    pub async fn add_role(&self, role: Role) {
        self.state
            .write()
            .await
            .roles
            .insert(role.role_key.clone(), role);
    }

    /// Adds or replaces the legacy membership of a principal in an organization.
    pub async fn add_membership(
        &self,
        subject: impl Into<String>,
        organization_id: OrganizationId,
        role: impl Into<String>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.organizations.contains(&organization_id) {
            return Err(AppError::Validation(format!(
                "organization '{organization_id}' does not exist"
            )));
        }

        state.memberships.insert(
            (subject.into(), organization_id.clone()),
            MembershipRecord {
                organization_id,
                role: role.into(),
                is_active: true,
            },
        );

        Ok(())
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn list_active_role_assignments(
        &self,
        subject: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let state = self.state.read().await;
        let now = Utc::now();

        let mut records: Vec<(i32, RoleAssignmentRecord)> = state
            .assignments
            .iter()
            .filter(|assignment| assignment.subject == subject && assignment.is_active)
            .filter_map(|assignment| {
                let role = state.roles.get(&assignment.role_key)?;
                let record = RoleAssignmentRecord {
                    role_key: assignment.role_key.clone(),
                    role_name: role.role_name.clone(),
                    company_id: assignment.company_id.clone(),
                    location_id: assignment.location_id.clone(),
                    expires_at: assignment.expires_at,
                    country_code: role.country_code.clone(),
                    is_active: assignment.is_active,
                    role_is_active: role.is_active,
                };
                record.is_effective_at(now).then_some((role.tier, record))
            })
            .collect();

        // Stable sort keeps insertion order within a tier.
        records.sort_by_key(|(tier, _)| *tier);
        Ok(records.into_iter().map(|(_, record)| record).collect())
    }

    async fn list_active_memberships(&self, subject: &str) -> AppResult<Vec<MembershipRecord>> {
        let state = self.state.read().await;

        Ok(state
            .memberships
            .iter()
            .filter(|((stored_subject, _), membership)| {
                stored_subject == subject && membership.is_active
            })
            .map(|(_, membership)| membership.clone())
            .collect())
    }

    async fn list_active_permissions(
        &self,
        resource: Resource,
        action: Option<Action>,
    ) -> AppResult<Vec<PermissionGrant>> {
        let state = self.state.read().await;

        let mut ranked = Vec::new();
        for record in state.permissions.values().filter(|record| {
            record.resource == resource
                && record.is_active
                && action.is_none_or(|action| record.action == action)
        }) {
            let role = state.role(&record.role_key)?;
            if role.is_active {
                ranked.push((role.tier, record));
            }
        }

        ranked.sort_by(|(left_tier, left), (right_tier, right)| {
            left_tier
                .cmp(right_tier)
                .then_with(|| left.role_key.cmp(&right.role_key))
                .then_with(|| left.action.as_str().cmp(right.action.as_str()))
        });

        Ok(ranked
            .into_iter()
            .map(|(_, record)| PermissionGrant::from(record))
            .collect())
    }

    async fn list_all_organization_ids(&self) -> AppResult<Vec<OrganizationId>> {
        Ok(self
            .state
            .read()
            .await
            .organizations
            .iter()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleAdminRepository for InMemoryRoleStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.state.read().await.roles.values().cloned().collect();
        roles.sort_by(|left, right| {
            left.tier
                .cmp(&right.tier)
                .then_with(|| left.role_key.cmp(&right.role_key))
        });
        Ok(roles)
    }

    async fn find_role(&self, role_key: &RoleKey) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(role_key).cloned())
    }

    async fn update_role(&self, role_key: &RoleKey, input: UpdateRoleInput) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .get_mut(role_key)
            .filter(|role| !role.is_system)
            .ok_or_else(|| {
                AppError::NotFound(format!("non-system role '{role_key}' does not exist"))
            })?;

        role.role_name = input.role_name.trim().to_owned();
        role.country_code = input.country_code;
        role.is_active = input.is_active;
        role.tier = input.tier;

        Ok(role.clone())
    }

    async fn assign_role(&self, input: AssignRoleInput) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&input.role_key) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                input.role_key
            )));
        }

        if let Some(company_id) = &input.company_id
            && !state.organizations.contains(company_id)
        {
            return Err(AppError::Validation(format!(
                "organization '{company_id}' does not exist"
            )));
        }

        state.assignments.push(StoredAssignment {
            subject: input.subject,
            role_key: input.role_key,
            company_id: input.company_id,
            location_id: input.location_id,
            expires_at: input.expires_at,
            is_active: true,
        });

        Ok(())
    }

    async fn revoke_role(&self, input: RevokeRoleInput) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut revoked = 0_u64;

        for assignment in state.assignments.iter_mut().filter(|assignment| {
            assignment.is_active
                && assignment.subject == input.subject
                && assignment.role_key == input.role_key
                && assignment.company_id == input.company_id
        }) {
            assignment.is_active = false;
            revoked += 1;
        }

        Ok(revoked)
    }

    async fn save_permission(&self, record: PermissionRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&record.role_key) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                record.role_key
            )));
        }

        // Field restrictions cover the whole resource, so every action of the
        // role on that resource shares them.
        for sibling in state.permissions.values_mut().filter(|existing| {
            existing.role_key == record.role_key && existing.resource == record.resource
        }) {
            sibling.field_restrictions = record.field_restrictions.clone();
        }

        state.permissions.insert(
            (record.role_key.clone(), record.resource, record.action),
            record,
        );

        Ok(())
    }
}
