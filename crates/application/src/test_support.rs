use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use custos_core::{AppError, AppResult, OrganizationId};
use custos_domain::{
    Action, FieldRestrictionMap, FieldVisibility, MembershipRecord, PermissionGrant,
    PermissionRecord, ResolvedRole, ResolvedRoleSet, Resource, RoleAssignmentRecord, RoleKey,
};
use tokio::sync::{Mutex, Notify};

use crate::{AuditEvent, AuditRepository, RoleSetCache, RoleSource, RoleStore};

pub(crate) fn role_key(value: &str) -> RoleKey {
    RoleKey::new(value).unwrap_or_else(|error| panic!("invalid test role key: {error}"))
}

pub(crate) fn organization(value: &str) -> OrganizationId {
    OrganizationId::new(value).unwrap_or_else(|error| panic!("invalid test organization: {error}"))
}

pub(crate) fn assignment(
    role: &str,
    company: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> RoleAssignmentRecord {
    RoleAssignmentRecord {
        role_key: role_key(role),
        role_name: role.to_owned(),
        company_id: company.map(organization),
        location_id: None,
        expires_at,
        country_code: None,
        is_active: true,
        role_is_active: true,
    }
}

pub(crate) fn membership(organization_id: &str, role: &str) -> MembershipRecord {
    MembershipRecord {
        organization_id: organization(organization_id),
        role: role.to_owned(),
        is_active: true,
    }
}

pub(crate) fn permission(
    role: &str,
    resource: Resource,
    action: Action,
    fields: &[(&str, FieldVisibility)],
) -> PermissionRecord {
    PermissionRecord {
        role_key: role_key(role),
        resource,
        action,
        is_active: true,
        field_restrictions: fields
            .iter()
            .map(|(field, level)| ((*field).to_owned(), *level))
            .collect::<FieldRestrictionMap>(),
    }
}

/// Hand-rolled role store returning exactly what a test seeds.
#[derive(Default)]
pub(crate) struct FakeRoleStore {
    pub assignments: HashMap<String, Vec<RoleAssignmentRecord>>,
    pub memberships: HashMap<String, Vec<MembershipRecord>>,
    pub permissions: Vec<PermissionRecord>,
    pub organizations: Vec<OrganizationId>,
    pub fail_assignments: bool,
    pub fail_memberships: bool,
    pub fail_permissions: bool,
    pub assignment_calls: AtomicUsize,
    pub membership_calls: AtomicUsize,
}

impl FakeRoleStore {
    pub(crate) fn with_assignments(mut self, subject: &str, rows: Vec<RoleAssignmentRecord>) -> Self {
        self.assignments.insert(subject.to_owned(), rows);
        self
    }

    pub(crate) fn with_memberships(mut self, subject: &str, rows: Vec<MembershipRecord>) -> Self {
        self.memberships.insert(subject.to_owned(), rows);
        self
    }

    pub(crate) fn with_permissions(mut self, rows: Vec<PermissionRecord>) -> Self {
        self.permissions = rows;
        self
    }

    pub(crate) fn with_organizations(mut self, ids: &[&str]) -> Self {
        self.organizations = ids.iter().map(|id| organization(id)).collect();
        self
    }

    pub(crate) fn membership_calls(&self) -> usize {
        self.membership_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn assignment_calls(&self) -> usize {
        self.assignment_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for FakeRoleStore {
    async fn list_active_role_assignments(
        &self,
        subject: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        self.assignment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_assignments {
            return Err(AppError::Internal("connection refused".to_owned()));
        }

        Ok(self.assignments.get(subject).cloned().unwrap_or_default())
    }

    async fn list_active_memberships(&self, subject: &str) -> AppResult<Vec<MembershipRecord>> {
        self.membership_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_memberships {
            return Err(AppError::Internal("connection refused".to_owned()));
        }

        Ok(self.memberships.get(subject).cloned().unwrap_or_default())
    }

    async fn list_active_permissions(
        &self,
        resource: Resource,
        action: Option<Action>,
    ) -> AppResult<Vec<PermissionGrant>> {
        if self.fail_permissions {
            return Err(AppError::Internal("connection refused".to_owned()));
        }

        Ok(self
            .permissions
            .iter()
            .filter(|record| record.is_active && record.resource == resource)
            .filter(|record| action.is_none_or(|action| record.action == action))
            .map(PermissionGrant::from)
            .collect())
    }

    async fn list_all_organization_ids(&self) -> AppResult<Vec<OrganizationId>> {
        Ok(self.organizations.clone())
    }
}

/// Role-set cache without expiry; ttl values are recorded for assertions.
#[derive(Default)]
pub(crate) struct FakeRoleSetCache {
    pub entries: Mutex<HashMap<String, (ResolvedRoleSet, u32)>>,
    pub fail_reads: bool,
}

impl FakeRoleSetCache {
    pub(crate) async fn contains(&self, subject: &str) -> bool {
        self.entries.lock().await.contains_key(subject)
    }
}

#[async_trait]
impl RoleSetCache for FakeRoleSetCache {
    async fn get_role_set(&self, subject: &str) -> AppResult<Option<ResolvedRoleSet>> {
        if self.fail_reads {
            return Err(AppError::Internal("cache unavailable".to_owned()));
        }

        Ok(self
            .entries
            .lock()
            .await
            .get(subject)
            .map(|(roles, _)| roles.clone()))
    }

    async fn set_role_set(
        &self,
        subject: &str,
        roles: &ResolvedRoleSet,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .insert(subject.to_owned(), (roles.clone(), ttl_seconds));
        Ok(())
    }

    async fn remove_role_set(&self, subject: &str) -> AppResult<()> {
        self.entries.lock().await.remove(subject);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// Role source that parks every load until the test releases it.
pub(crate) struct GatedRoleSource {
    pub roles: Vec<RoleKey>,
    pub gate: Arc<Notify>,
    pub calls: AtomicUsize,
}

impl GatedRoleSource {
    pub(crate) fn new(roles: &[&str]) -> Self {
        Self {
            roles: roles.iter().map(|role| role_key(role)).collect(),
            gate: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleSource for GatedRoleSource {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn load_roles(&self, _subject: &str) -> AppResult<Vec<ResolvedRole>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.roles.iter().cloned().map(ResolvedRole::new).collect())
    }
}
