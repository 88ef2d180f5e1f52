use std::sync::Arc;

use chrono::Utc;
use custos_core::{AppError, AppResult, OrganizationId, UserIdentity};
use custos_domain::{AuditAction, PermissionRecord, Role, RoleKey};
use tracing::info;

use crate::{
    AccessGuard, AssignRoleInput, AuditEvent, AuditRepository, AuthorizationService,
    RevokeRoleInput, RoleAdminRepository, UpdateRoleInput,
};


/// Super-admin administration of roles, assignments and permissions.
///
/// Every mutation invalidates the cached authority it affects and appends
/// an audit event.
#[derive(Clone)]
pub struct RoleAdminService {
    repository: Arc<dyn RoleAdminRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    authorization: AuthorizationService,
    guard: AccessGuard,
}

impl RoleAdminService {
    /// Creates a new role administration service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RoleAdminRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        authorization: AuthorizationService,
    ) -> Self {
        Self {
            repository,
            audit_repository,
            guard: AccessGuard::new(authorization.clone()),
            authorization,
        }
    }

    /// Lists every role ordered by tier.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<Role>> {
        self.guard.require_super_admin(actor.subject()).await?;
        self.repository.list_roles().await
    }

    /// Updates a non-system role.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_key: &RoleKey,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.guard.require_super_admin(actor.subject()).await?;

        let existing = self.find_role(role_key).await?;
        if existing.is_system {
            return Err(AppError::Conflict(format!(
                "system role '{role_key}' is immutable"
            )));
        }

        if input.role_name.trim().is_empty() {
            return Err(AppError::Validation("role_name must not be empty".to_owned()));
        }

        let activation_changed = existing.is_active != input.is_active;
        let role = self.repository.update_role(role_key, input).await?;

        if activation_changed {
            self.authorization.invalidate_all().await?;
        }

        self.append_audit(
            actor,
            None,
            AuditAction::SecurityRoleUpdated,
            "role",
            role_key.to_string(),
            format!(
                "updated role '{role_key}' (name='{}', active={}, tier={})",
                role.role_name, role.is_active, role.tier
            ),
        )
        .await?;

        Ok(role)
    }

    /// Creates a structured assignment and drops the principal's cached authority.
    pub async fn assign_role(&self, actor: &UserIdentity, input: AssignRoleInput) -> AppResult<()> {
        self.guard.require_super_admin(actor.subject()).await?;

        if input.subject.trim().is_empty() {
            return Err(AppError::Validation("subject must not be empty".to_owned()));
        }

        if input.expires_at.is_some_and(|expires_at| expires_at <= Utc::now()) {
            return Err(AppError::Validation(
                "expires_at must be in the future".to_owned(),
            ));
        }

        let role = self.find_role(&input.role_key).await?;
        if !role.is_active {
            return Err(AppError::Conflict(format!(
                "role '{}' is inactive",
                role.role_key
            )));
        }

        let subject = input.subject.clone();
        let organization_id = input.company_id.clone();
        let detail = format!(
            "assigned role '{}' to '{subject}' in '{}'",
            input.role_key,
            scope_label(organization_id.as_ref())
        );
        let resource_id = format!("{subject}:{}", input.role_key);

        self.repository.assign_role(input).await?;
        self.authorization.invalidate_principal(subject.as_str()).await?;
        info!(subject = subject.as_str(), role_key = %role.role_key, "role assigned");

        self.append_audit(
            actor,
            organization_id,
            AuditAction::SecurityRoleAssigned,
            "role_assignment",
            resource_id,
            detail,
        )
        .await
    }

    /// Deactivates matching assignments and drops the principal's cached authority.
    pub async fn revoke_assignment(
        &self,
        actor: &UserIdentity,
        input: RevokeRoleInput,
    ) -> AppResult<u64> {
        self.guard.require_super_admin(actor.subject()).await?;

        let subject = input.subject.clone();
        let organization_id = input.company_id.clone();
        let resource_id = format!("{subject}:{}", input.role_key);
        let role_key = input.role_key.clone();

        let revoked = self.repository.revoke_role(input).await?;
        if revoked == 0 {
            return Err(AppError::NotFound(format!(
                "no active assignment of role '{role_key}' for subject '{subject}' in '{}'",
                scope_label(organization_id.as_ref())
            )));
        }

        self.authorization.invalidate_principal(subject.as_str()).await?;
        info!(
            subject = subject.as_str(),
            role_key = %role_key,
            revoked,
            "role assignment revoked"
        );

        self.append_audit(
            actor,
            organization_id.clone(),
            AuditAction::SecurityRoleRevoked,
            "role_assignment",
            resource_id,
            format!(
                "revoked {revoked} assignment(s) of role '{role_key}' from '{subject}' in '{}'",
                scope_label(organization_id.as_ref())
            ),
        )
        .await?;

        Ok(revoked)
    }

    /// Creates or replaces the permission record for its role, resource and action.
    ///
    /// Permissions are evaluated against the store on every query, so no
    /// cached role set is affected.
    pub async fn save_permission(
        &self,
        actor: &UserIdentity,
        record: PermissionRecord,
    ) -> AppResult<()> {
        self.guard.require_super_admin(actor.subject()).await?;

        if record.role_key.is_super_admin() {
            return Err(AppError::Conflict(
                "super_admin bypasses the permission table".to_owned(),
            ));
        }

        self.find_role(&record.role_key).await?;

        let resource_id = format!(
            "{}:{}:{}",
            record.role_key, record.resource, record.action
        );
        let detail = format!(
            "saved permission {}.{} for role '{}' (active={}, restricted_fields={})",
            record.resource,
            record.action,
            record.role_key,
            record.is_active,
            record.field_restrictions.len()
        );

        self.repository.save_permission(record).await?;

        self.append_audit(
            actor,
            None,
            AuditAction::SecurityPermissionSaved,
            "role_permission",
            resource_id,
            detail,
        )
        .await
    }

    /// Drops one principal's cached authority, or everyone's.
    pub async fn invalidate(&self, actor: &UserIdentity, subject: Option<&str>) -> AppResult<()> {
        self.guard.require_super_admin(actor.subject()).await?;

        match subject {
            Some(subject) => self.authorization.invalidate_principal(subject).await?,
            None => self.authorization.invalidate_all().await?,
        }

        self.append_audit(
            actor,
            None,
            AuditAction::SecurityAuthorizationInvalidated,
            "authorization_cache",
            subject.unwrap_or("*").to_owned(),
            match subject {
                Some(subject) => format!("invalidated cached authority of '{subject}'"),
                None => "invalidated all cached authority".to_owned(),
            },
        )
        .await
    }

    async fn find_role(&self, role_key: &RoleKey) -> AppResult<Role> {
        self.repository
            .find_role(role_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_key}' does not exist")))
    }

    async fn append_audit(
        &self,
        actor: &UserIdentity,
        organization_id: Option<OrganizationId>,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                organization_id,
                subject: actor.subject().to_owned(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}

fn scope_label(organization_id: Option<&OrganizationId>) -> &str {
    organization_id.map_or("global scope", OrganizationId::as_str)
}
