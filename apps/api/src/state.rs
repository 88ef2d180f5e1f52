use std::sync::Arc;

use custos_application::{AccessGuard, AuthorizationService, RoleAdminService};
use custos_infrastructure::InMemoryPolicyMatrix;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub access_guard: AccessGuard,
    pub role_admin_service: RoleAdminService,
    /// Present when grants are evaluated against the in-memory matrix, which
    /// saved permissions must be mirrored into.
    pub policy_matrix: Option<Arc<InMemoryPolicyMatrix>>,
    pub frontend_url: String,
    pub bootstrap_token: Option<String>,
}
