use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use custos_application::{
    AssignRoleInput, RevokeRoleInput, RoleAdminRepository, RoleStore, UpdateRoleInput,
};
use custos_core::{AppError, AppResult, OrganizationId};
use custos_domain::{
    Action, FieldRestrictionMap, FieldVisibility, MembershipRecord, PermissionGrant,
    PermissionRecord, Resource, Role, RoleAssignmentRecord, RoleKey,
};

mod admin;
mod assignments;
mod permissions;


/// PostgreSQL-backed role store and role administration repository.
#[derive(Clone)]
pub struct PostgresRoleStore {
    pool: PgPool,
}

impl PostgresRoleStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_key: String,
    role_name: String,
    country_code: Option<String>,
    is_system: bool,
    is_active: bool,
    tier: i32,
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    role_key: String,
    role_name: String,
    company_id: Option<String>,
    location_id: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    country_code: Option<String>,
    is_active: bool,
    role_is_active: bool,
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    organization_id: String,
    role: String,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    role_key: String,
    resource: String,
    action: String,
    is_active: bool,
    field_restrictions: Json<BTreeMap<String, String>>,
}

#[async_trait]
impl RoleStore for PostgresRoleStore {
    async fn list_active_role_assignments(
        &self,
        subject: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        self.list_active_role_assignments_impl(subject).await
    }

    async fn list_active_memberships(&self, subject: &str) -> AppResult<Vec<MembershipRecord>> {
        self.list_active_memberships_impl(subject).await
    }

    async fn list_active_permissions(
        &self,
        resource: Resource,
        action: Option<Action>,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.list_active_permissions_impl(resource, action).await
    }

    async fn list_all_organization_ids(&self) -> AppResult<Vec<OrganizationId>> {
        self.list_all_organization_ids_impl().await
    }
}

#[async_trait]
impl RoleAdminRepository for PostgresRoleStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.list_roles_impl().await
    }

    async fn find_role(&self, role_key: &RoleKey) -> AppResult<Option<Role>> {
        self.find_role_impl(role_key).await
    }

    async fn update_role(&self, role_key: &RoleKey, input: UpdateRoleInput) -> AppResult<Role> {
        self.update_role_impl(role_key, input).await
    }

    async fn assign_role(&self, input: AssignRoleInput) -> AppResult<()> {
        self.assign_role_impl(input).await
    }

    async fn revoke_role(&self, input: RevokeRoleInput) -> AppResult<u64> {
        self.revoke_role_impl(input).await
    }

    async fn save_permission(&self, record: PermissionRecord) -> AppResult<()> {
        self.save_permission_impl(record).await
    }
}

fn stored_role_key(value: String) -> AppResult<RoleKey> {
    RoleKey::new(value)
        .map_err(|error| AppError::Configuration(format!("invalid stored role key: {error}")))
}

fn stored_organization_id(value: String) -> AppResult<OrganizationId> {
    OrganizationId::new(value).map_err(|error| {
        AppError::Configuration(format!("invalid stored organization id: {error}"))
    })
}

fn stored<T>(value: &str, column: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    T::from_str(value).map_err(|error| {
        AppError::Configuration(format!("invalid stored {column} '{value}': {error}"))
    })
}

fn stored_field_restrictions(
    restrictions: BTreeMap<String, String>,
) -> AppResult<FieldRestrictionMap> {
    restrictions
        .into_iter()
        .map(|(field, level)| {
            let level = stored::<FieldVisibility>(level.as_str(), "field visibility")?;
            Ok((field, level))
        })
        .collect()
}

fn encoded_field_restrictions(restrictions: &FieldRestrictionMap) -> BTreeMap<String, String> {
    restrictions
        .iter()
        .map(|(field, level)| (field.clone(), level.as_str().to_owned()))
        .collect()
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> AppResult<Self> {
        Ok(Self {
            role_key: stored_role_key(row.role_key)?,
            role_name: row.role_name,
            country_code: row.country_code,
            is_system: row.is_system,
            is_active: row.is_active,
            tier: row.tier,
        })
    }
}
