use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use axum::{Extension, Router};
use custos_core::AppError;
use custos_domain::{CONSULTANT_ROLE, MANAGER_ROLE, RoleKey, TENANT_ADMIN_ROLE};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{AllowedRoles, RequiredRoles};
use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

#[cfg(test)]
mod tests;

const MANAGEMENT_ROLES: &[&str] = &[CONSULTANT_ROLE, TENANT_ADMIN_ROLE];
const REPORT_ROLES: &[&str] = &[CONSULTANT_ROLE, TENANT_ADMIN_ROLE, MANAGER_ROLE];

pub fn build_router<Store>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let authorization_routes = Router::new()
        .route(
            "/api/authorization/me",
            get(handlers::authorization::me_handler),
        )
        .route(
            "/api/authorization/permissions/{resource}",
            get(handlers::authorization::permission_state_handler),
        )
        .route(
            "/api/authorization/check",
            get(handlers::authorization::check_permission_handler),
        );

    let organization_routes = Router::new()
        .route(
            "/api/organizations/{organization_id}/access",
            get(handlers::organizations::organization_access_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_organization_access,
        ))
        .layer(Extension(RequiredRoles::default()));

    let management_routes = Router::new()
        .route(
            "/api/organizations/{organization_id}/management",
            get(handlers::organizations::organization_access_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_organization_access,
        ))
        .layer(Extension(RequiredRoles(role_keys(MANAGEMENT_ROLES)?)));

    let report_routes = Router::new()
        .route(
            "/api/reports/access",
            get(handlers::reports::reports_access_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_roles,
        ))
        .layer(Extension(AllowedRoles(role_keys(REPORT_ROLES)?)));

    let admin_routes = Router::new()
        .route("/api/admin/roles", get(handlers::admin::list_roles_handler))
        .route(
            "/api/admin/roles/{role_key}",
            put(handlers::admin::update_role_handler),
        )
        .route(
            "/api/admin/role-assignments",
            post(handlers::admin::assign_role_handler),
        )
        .route(
            "/api/admin/role-revocations",
            post(handlers::admin::revoke_role_handler),
        )
        .route(
            "/api/admin/permissions",
            put(handlers::admin::save_permission_handler),
        )
        .route(
            "/api/admin/authorization/invalidate",
            post(handlers::admin::invalidate_authorization_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_super_admin,
        ));

    let protected_routes = Router::new()
        .merge(authorization_routes)
        .merge(organization_routes)
        .merge(management_routes)
        .merge(report_routes)
        .merge(admin_routes)
        .route_layer(from_fn(middleware::require_auth));

    let cors = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(session_layer)
        .with_state(app_state))
}

fn role_keys(values: &[&str]) -> Result<Vec<RoleKey>, AppError> {
    values.iter().map(|value| RoleKey::new(*value)).collect()
}
