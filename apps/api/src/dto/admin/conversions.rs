use std::str::FromStr;

use chrono::{DateTime, Utc};
use custos_application::{AssignRoleInput, RevokeRoleInput, UpdateRoleInput};
use custos_core::{AppError, AppResult, OrganizationId};
use custos_domain::{
    Action, FieldRestrictionMap, FieldVisibility, PermissionRecord, Resource, Role, RoleKey,
};

use super::{
    AssignRoleRequest, PermissionResponse, RevokeRoleRequest, RoleResponse,
    SavePermissionRequest, UpdateRoleRequest,
};

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_key: value.role_key.to_string(),
            role_name: value.role_name,
            country_code: value.country_code,
            is_system: value.is_system,
            is_active: value.is_active,
            tier: value.tier,
        }
    }
}

impl From<PermissionRecord> for PermissionResponse {
    fn from(value: PermissionRecord) -> Self {
        Self {
            role_key: value.role_key.to_string(),
            resource: value.resource.as_str().to_owned(),
            action: value.action.as_str().to_owned(),
            is_active: value.is_active,
            field_restrictions: value
                .field_restrictions
                .into_iter()
                .map(|(field, level)| (field, level.as_str().to_owned()))
                .collect(),
        }
    }
}

impl From<UpdateRoleRequest> for UpdateRoleInput {
    fn from(value: UpdateRoleRequest) -> Self {
        Self {
            role_name: value.role_name,
            country_code: value.country_code.filter(|code| !code.trim().is_empty()),
            is_active: value.is_active,
            tier: value.tier,
        }
    }
}

impl TryFrom<AssignRoleRequest> for AssignRoleInput {
    type Error = AppError;

    fn try_from(value: AssignRoleRequest) -> AppResult<Self> {
        Ok(Self {
            subject: value.subject,
            role_key: RoleKey::new(value.role_key)?,
            company_id: optional_organization_id(value.organization_id)?,
            location_id: value.location_id.filter(|location| !location.trim().is_empty()),
            expires_at: value
                .expires_at
                .as_deref()
                .map(parse_expiry)
                .transpose()?,
        })
    }
}

impl TryFrom<RevokeRoleRequest> for RevokeRoleInput {
    type Error = AppError;

    fn try_from(value: RevokeRoleRequest) -> AppResult<Self> {
        Ok(Self {
            subject: value.subject,
            role_key: RoleKey::new(value.role_key)?,
            company_id: optional_organization_id(value.organization_id)?,
        })
    }
}

impl TryFrom<SavePermissionRequest> for PermissionRecord {
    type Error = AppError;

    fn try_from(value: SavePermissionRequest) -> AppResult<Self> {
        let field_restrictions = value
            .field_restrictions
            .into_iter()
            .map(|(field, level)| Ok((field, FieldVisibility::from_str(level.as_str())?)))
            .collect::<AppResult<FieldRestrictionMap>>()?;

        Ok(Self {
            role_key: RoleKey::new(value.role_key)?,
            resource: Resource::from_str(value.resource.as_str())?,
            action: Action::from_str(value.action.as_str())?,
            is_active: value.is_active,
            field_restrictions,
        })
    }
}

fn optional_organization_id(value: Option<String>) -> AppResult<Option<OrganizationId>> {
    value
        .filter(|organization_id| !organization_id.trim().is_empty())
        .map(OrganizationId::new)
        .transpose()
}

fn parse_expiry(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|expires_at| expires_at.with_timezone(&Utc))
        .map_err(|error| AppError::Validation(format!("invalid expires_at '{value}': {error}")))
}
