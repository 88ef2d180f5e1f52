use axum::Json;
use axum::extract::Extension;
use custos_application::OrganizationAccess;

use crate::dto::OrganizationAccessResponse;

/// Echoes the membership context attached by the tenant-membership guard.
pub async fn organization_access_handler(
    Extension(access): Extension<OrganizationAccess>,
) -> Json<OrganizationAccessResponse> {
    Json(access.into())
}
