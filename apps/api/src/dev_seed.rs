use custos_application::{AssignRoleInput, RoleAdminRepository};
use custos_core::{AppResult, OrganizationId};
use custos_domain::{
    CONSULTANT_ROLE, EMPLOYEE_ROLE, MANAGER_ROLE, RoleKey, SUPER_ADMIN_ROLE, TENANT_ADMIN_ROLE,
};
use custos_infrastructure::InMemoryRoleStore;
use tracing::info;

const DEV_SEED_ORGANIZATIONS: &[&str] = &["org-1", "org-2", "org-3", "org-9"];

/// Subject, role key, organization.
const DEV_SEED_ASSIGNMENTS: &[(&str, &str, Option<&str>)] = &[
    ("root", SUPER_ADMIN_ROLE, None),
    ("dan", CONSULTANT_ROLE, Some("org-1")),
    ("dan", CONSULTANT_ROLE, Some("org-2")),
    ("ana", TENANT_ADMIN_ROLE, Some("org-1")),
    ("ana", EMPLOYEE_ROLE, Some("org-2")),
    ("mara", MANAGER_ROLE, Some("org-9")),
    ("eva", EMPLOYEE_ROLE, Some("org-9")),
];

/// Subject, organization, legacy membership role.
const DEV_SEED_MEMBERSHIPS: &[(&str, &str, &str)] = &[
    ("ion", "org-3", "consultant"),
    // Shadowed by the structured assignment above.
    ("mara", "org-1", "firma_admin"),
];

/// Seeds demo organizations, assignments and legacy memberships.
pub async fn run(store: &InMemoryRoleStore) -> AppResult<()> {
    for organization_id in DEV_SEED_ORGANIZATIONS {
        store
            .add_organization(OrganizationId::new(*organization_id)?)
            .await;
    }

    for (subject, role_key, organization_id) in DEV_SEED_ASSIGNMENTS {
        store
            .assign_role(AssignRoleInput {
                subject: (*subject).to_owned(),
                role_key: RoleKey::new(*role_key)?,
                company_id: organization_id.map(OrganizationId::new).transpose()?,
                location_id: None,
                expires_at: None,
            })
            .await?;
    }

    for (subject, organization_id, role) in DEV_SEED_MEMBERSHIPS {
        store
            .add_membership(*subject, OrganizationId::new(*organization_id)?, *role)
            .await?;
    }

    info!(
        organizations = DEV_SEED_ORGANIZATIONS.len(),
        assignments = DEV_SEED_ASSIGNMENTS.len(),
        memberships = DEV_SEED_MEMBERSHIPS.len(),
        "dev seed applied"
    );
    Ok(())
}
