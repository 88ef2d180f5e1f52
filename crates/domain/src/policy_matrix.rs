//! Default policy shipped with the platform.
//!
//! Stores are seeded from here; at runtime the persisted records (or an
//! injected policy source) are authoritative.

use crate::{
    Action, CONSULTANT_ROLE, EMPLOYEE_ROLE, FieldRestrictionMap, FieldVisibility, MANAGER_ROLE,
    PermissionRecord, Resource, Role, RoleKey, SUPER_ADMIN_ROLE, TENANT_ADMIN_ROLE,
};

use crate::Action::{Create, Delete, Export, Read, Update};
use crate::FieldVisibility::{Hidden, Masked};

const ALL_ACTIONS: &[Action] = &[Create, Read, Update, Delete, Export];

struct RoleSeed {
    role_key: &'static str,
    role_name: &'static str,
    tier: i32,
}

const SYSTEM_ROLES: &[RoleSeed] = &[
    RoleSeed {
        role_key: SUPER_ADMIN_ROLE,
        role_name: "Super administrator",
        tier: 0,
    },
    RoleSeed {
        role_key: CONSULTANT_ROLE,
        role_name: "Consultant SSM",
        tier: 10,
    },
    RoleSeed {
        role_key: TENANT_ADMIN_ROLE,
        role_name: "Administrator firma",
        tier: 20,
    },
    RoleSeed {
        role_key: MANAGER_ROLE,
        role_name: "Manager",
        tier: 30,
    },
    RoleSeed {
        role_key: EMPLOYEE_ROLE,
        role_name: "Angajat",
        tier: 40,
    },
];

type GrantRow = (&'static str, Resource, &'static [Action]);

// super_admin needs no rows: the evaluator bypasses the table for it.
const GRANTS: &[GrantRow] = &[
    (CONSULTANT_ROLE, Resource::Employees, ALL_ACTIONS),
    (CONSULTANT_ROLE, Resource::Trainings, ALL_ACTIONS),
    (CONSULTANT_ROLE, Resource::Medical, ALL_ACTIONS),
    (CONSULTANT_ROLE, Resource::Equipment, ALL_ACTIONS),
    (CONSULTANT_ROLE, Resource::Documents, ALL_ACTIONS),
    (CONSULTANT_ROLE, Resource::Reports, ALL_ACTIONS),
    (CONSULTANT_ROLE, Resource::Alerts, ALL_ACTIONS),
    (CONSULTANT_ROLE, Resource::Settings, &[Read]),
    (CONSULTANT_ROLE, Resource::Team, &[Read]),
    (CONSULTANT_ROLE, Resource::Audit, &[Read, Export]),
    (TENANT_ADMIN_ROLE, Resource::Employees, ALL_ACTIONS),
    (TENANT_ADMIN_ROLE, Resource::Trainings, &[Create, Read, Update, Delete]),
    (TENANT_ADMIN_ROLE, Resource::Medical, &[Read, Export]),
    (TENANT_ADMIN_ROLE, Resource::Equipment, &[Create, Read, Update, Delete]),
    (TENANT_ADMIN_ROLE, Resource::Documents, &[Create, Read, Update, Delete]),
    (TENANT_ADMIN_ROLE, Resource::Reports, &[Read, Export]),
    (TENANT_ADMIN_ROLE, Resource::Settings, &[Read, Update]),
    (TENANT_ADMIN_ROLE, Resource::Team, &[Create, Read, Update, Delete]),
    (TENANT_ADMIN_ROLE, Resource::Alerts, &[Read, Update]),
    (TENANT_ADMIN_ROLE, Resource::Audit, &[Read]),
    (MANAGER_ROLE, Resource::Employees, &[Create, Read, Update]),
    (MANAGER_ROLE, Resource::Trainings, &[Create, Read, Update]),
    (MANAGER_ROLE, Resource::Medical, &[Read]),
    (MANAGER_ROLE, Resource::Equipment, &[Read, Update]),
    (MANAGER_ROLE, Resource::Documents, &[Create, Read]),
    (MANAGER_ROLE, Resource::Reports, &[Read]),
    (MANAGER_ROLE, Resource::Team, &[Read]),
    (MANAGER_ROLE, Resource::Alerts, &[Read]),
    (EMPLOYEE_ROLE, Resource::Employees, &[Read]),
    (EMPLOYEE_ROLE, Resource::Trainings, &[Read]),
    (EMPLOYEE_ROLE, Resource::Documents, &[Read]),
    (EMPLOYEE_ROLE, Resource::Alerts, &[Read]),
];

type RestrictionRow = (&'static str, Resource, &'static [(&'static str, FieldVisibility)]);

const FIELD_RESTRICTIONS: &[RestrictionRow] = &[
    (
        TENANT_ADMIN_ROLE,
        Resource::Medical,
        &[("diagnosis", Hidden), ("restrictions", Masked)],
    ),
    (
        MANAGER_ROLE,
        Resource::Employees,
        &[("cnp", Masked), ("salary", Hidden), ("home_address", Hidden)],
    ),
    (
        MANAGER_ROLE,
        Resource::Medical,
        &[("diagnosis", Hidden), ("restrictions", Hidden)],
    ),
    (
        EMPLOYEE_ROLE,
        Resource::Employees,
        &[
            ("cnp", Hidden),
            ("salary", Hidden),
            ("home_address", Hidden),
            ("phone", Masked),
        ],
    ),
];

/// Returns the platform-defined roles.
#[must_use]
pub fn system_roles() -> Vec<Role> {
    SYSTEM_ROLES
        .iter()
        .map(|seed| Role {
            role_key: RoleKey(seed.role_key.to_owned()),
            role_name: seed.role_name.to_owned(),
            country_code: None,
            is_system: true,
            is_active: true,
            tier: seed.tier,
        })
        .collect()
}

/// Returns the default permission records, one per role, resource and action.
#[must_use]
pub fn default_permissions() -> Vec<PermissionRecord> {
    GRANTS
        .iter()
        .flat_map(|(role_key, resource, actions)| {
            let field_restrictions = default_field_restrictions(role_key, *resource);
            actions.iter().map(move |action| PermissionRecord {
                role_key: RoleKey((*role_key).to_owned()),
                resource: *resource,
                action: *action,
                is_active: true,
                field_restrictions: field_restrictions.clone(),
            })
        })
        .collect()
}

fn default_field_restrictions(role_key: &str, resource: Resource) -> FieldRestrictionMap {
    FIELD_RESTRICTIONS
        .iter()
        .filter(|(row_role, row_resource, _)| *row_role == role_key && *row_resource == resource)
        .flat_map(|(_, _, fields)| fields.iter())
        .map(|(field, level)| ((*field).to_owned(), *level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{default_permissions, system_roles};
    use crate::{Action, FieldVisibility, MANAGER_ROLE, Resource};

    fn grants(role_key: &str, resource: Resource, action: Action) -> bool {
        default_permissions().iter().any(|record| {
            record.role_key.as_str() == role_key
                && record.resource == resource
                && record.action == action
        })
    }

    #[test]
    fn manager_cannot_delete_employees() {
        assert!(grants(MANAGER_ROLE, Resource::Employees, Action::Update));
        assert!(!grants(MANAGER_ROLE, Resource::Employees, Action::Delete));
    }

    #[test]
    fn every_grant_references_a_system_role() {
        let roles = system_roles();
        for record in default_permissions() {
            assert!(roles.iter().any(|role| role.role_key == record.role_key));
        }
    }

    #[test]
    fn restrictions_are_attached_to_every_action_of_the_resource() {
        let manager_medical: Vec<_> = default_permissions()
            .into_iter()
            .filter(|record| {
                record.role_key.as_str() == MANAGER_ROLE && record.resource == Resource::Medical
            })
            .collect();

        assert!(!manager_medical.is_empty());
        for record in manager_medical {
            assert_eq!(
                record.field_restrictions.get("diagnosis"),
                Some(&FieldVisibility::Hidden)
            );
        }
    }
}
