use custos_application::{OrganizationAccess, PermissionState, PrincipalAuthority};
use custos_core::UserIdentity;
use custos_domain::ResolvedRole;

use super::{
    ActionPermissionResponse, AuthorityResponse, OrganizationAccessResponse,
    PermissionStateResponse, ResolvedRoleResponse,
};

impl From<&ResolvedRole> for ResolvedRoleResponse {
    fn from(value: &ResolvedRole) -> Self {
        Self {
            role_key: value.role_key.to_string(),
            role_name: value.role_name.clone(),
            company_id: value.company_id.as_ref().map(ToString::to_string),
            location_id: value.location_id.clone(),
            expires_at: value.expires_at.map(|expires_at| expires_at.to_rfc3339()),
            country_code: value.country_code.clone(),
        }
    }
}

impl AuthorityResponse {
    pub fn new(identity: &UserIdentity, authority: PrincipalAuthority) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(str::to_owned),
            source: authority.roles.source().map(str::to_owned),
            roles: authority.roles.roles().iter().map(Into::into).collect(),
            primary_role: authority.primary_role.map(|role| role.to_string()),
            is_super_admin: authority.roles.is_super_admin(),
            organization_ids: authority
                .organization_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl From<PermissionState> for PermissionStateResponse {
    fn from(value: PermissionState) -> Self {
        Self {
            resource: value.resource.as_str().to_owned(),
            pending: value.pending,
            actions: value
                .actions
                .iter()
                .map(|permission| ActionPermissionResponse {
                    action: permission.action.as_str().to_owned(),
                    allowed: permission.allowed,
                })
                .collect(),
            field_restrictions: value
                .field_restrictions
                .levels()
                .iter()
                .map(|(field, level)| (field.clone(), level.as_str().to_owned()))
                .collect(),
            fallback: value.field_restrictions.fallback().as_str().to_owned(),
        }
    }
}

impl From<OrganizationAccess> for OrganizationAccessResponse {
    fn from(value: OrganizationAccess) -> Self {
        Self {
            organization_id: value.organization_id.to_string(),
            global: value.global,
            primary_role: value.primary_role.map(|role| role.to_string()),
            roles: value.roles.iter().map(Into::into).collect(),
        }
    }
}
