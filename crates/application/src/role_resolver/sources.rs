use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use custos_core::{AppError, AppResult};
use custos_domain::{ResolvedRole, translate_membership_role};

use crate::{RoleSource, RoleStore};

/// Primary source: structured role assignments.
#[derive(Clone)]
pub struct AssignmentRoleSource {
    store: Arc<dyn RoleStore>,
}

impl AssignmentRoleSource {
    /// Creates the source over a role store.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleSource for AssignmentRoleSource {
    fn name(&self) -> &'static str {
        "role_assignments"
    }

    async fn load_roles(&self, subject: &str) -> AppResult<Vec<ResolvedRole>> {
        let now = Utc::now();
        let assignments = self.store.list_active_role_assignments(subject).await?;

        Ok(assignments
            .into_iter()
            .filter(|assignment| assignment.is_effective_at(now))
            .map(|assignment| ResolvedRole {
                role_key: assignment.role_key,
                role_name: Some(assignment.role_name),
                company_id: assignment.company_id,
                location_id: assignment.location_id,
                expires_at: assignment.expires_at,
                country_code: assignment.country_code,
            })
            .collect())
    }
}

/// Legacy fallback source: organization membership records.
#[derive(Clone)]
pub struct MembershipRoleSource {
    store: Arc<dyn RoleStore>,
}

impl MembershipRoleSource {
    /// Creates the source over a role store.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleSource for MembershipRoleSource {
    fn name(&self) -> &'static str {
        "memberships"
    }

    async fn load_roles(&self, subject: &str) -> AppResult<Vec<ResolvedRole>> {
        let memberships = self.store.list_active_memberships(subject).await?;

        memberships
            .into_iter()
            .filter(|membership| membership.is_active)
            .map(|membership| {
                let role_key = translate_membership_role(membership.role.as_str()).map_err(|_| {
                    AppError::Configuration(format!(
                        "membership of subject '{subject}' in organization '{}' has a blank role",
                        membership.organization_id
                    ))
                })?;

                Ok(ResolvedRole::new(role_key).in_organization(membership.organization_id))
            })
            .collect()
    }
}
