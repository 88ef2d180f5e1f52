use std::sync::Arc;

use custos_core::AppError;
use custos_domain::{Action, FieldVisibility, Resource, policy_matrix};

use crate::test_support::{
    FakeRoleSetCache, FakeRoleStore, GatedRoleSource, assignment, membership, organization,
};
use crate::{
    AuthorizationCache, RoleResolver, RoleSnapshot, RoleSource, RoleStore, StorePolicySource,
};

use super::AuthorizationService;

fn service_over(store: FakeRoleStore) -> (AuthorizationService, Arc<FakeRoleStore>) {
    let store = Arc::new(store);
    let store_port: Arc<dyn RoleStore> = store.clone();
    let service = AuthorizationService::new(
        store_port.clone(),
        Arc::new(StorePolicySource::new(store_port)),
        AuthorizationCache::new(Arc::new(FakeRoleSetCache::default()), 300),
    );
    (service, store)
}

fn seeded() -> FakeRoleStore {
    FakeRoleStore::default()
        .with_permissions(policy_matrix::default_permissions())
        .with_organizations(&["org-1", "org-2", "org-3", "org-9"])
}

#[tokio::test]
async fn manager_assignment_scenario() {
    let (service, _) = service_over(
        seeded().with_assignments("mara", vec![assignment("manager", Some("org-9"), None)]),
    );

    let roles = service.resolve("mara").await.unwrap_or_default();
    assert_eq!(roles.len(), 1);
    assert!(roles.contains_role("manager"));
    assert_eq!(roles.company_ids().into_iter().collect::<Vec<_>>(), vec![organization("org-9")]);

    let delete = service
        .can_perform("mara", Resource::Employees, Action::Delete)
        .await;
    let update = service
        .can_perform("mara", Resource::Employees, Action::Update)
        .await;
    assert!(matches!(delete, Ok(false)));
    assert!(matches!(update, Ok(true)));
}

#[tokio::test]
async fn legacy_consultant_scenario() {
    let (service, _) =
        service_over(seeded().with_memberships("ion", vec![membership("org-3", "consultant")]));

    let primary = service.primary_role("ion").await;
    assert!(matches!(primary, Ok(Some(ref role)) if role.as_str() == "consultant_ssm"));

    let scope = service.accessible_org_ids("ion").await.unwrap_or_default();
    assert_eq!(scope.into_iter().collect::<Vec<_>>(), vec![organization("org-3")]);
}

#[tokio::test]
async fn super_admin_is_allowed_everything_with_an_empty_table() {
    let (service, _) = service_over(
        FakeRoleStore::default()
            .with_assignments("root", vec![assignment("super_admin", None, None)]),
    );

    for resource in Resource::all() {
        for action in Action::all() {
            let allowed = service.can_perform("root", *resource, *action).await;
            assert!(matches!(allowed, Ok(true)));
        }
    }
}

#[tokio::test]
async fn principal_without_roles_is_denied_everything() {
    let (service, _) = service_over(seeded());

    for resource in Resource::all() {
        for action in Action::all() {
            let allowed = service.can_perform("ghost", *resource, *action).await;
            assert!(matches!(allowed, Ok(false)));
        }
    }

    let denied = service
        .require_permission("ghost", Resource::Reports, Action::Read)
        .await;
    assert!(matches!(
        denied,
        Err(AppError::PermissionDenied { ref resource, ref action })
            if resource == "reports" && action == "read"
    ));
}

#[tokio::test]
async fn organization_scope_depends_on_super_admin() {
    let (service, _) = service_over(
        seeded()
            .with_assignments(
                "ana",
                vec![
                    assignment("manager", Some("org-1"), None),
                    assignment("angajat", Some("org-2"), None),
                    assignment("angajat", Some("org-1"), None),
                ],
            )
            .with_assignments("root", vec![assignment("super_admin", Some("org-1"), None)]),
    );

    let ana = service.accessible_org_ids("ana").await.unwrap_or_default();
    assert_eq!(ana.len(), 2);
    assert!(ana.contains(&organization("org-1")) && ana.contains(&organization("org-2")));

    let root = service.accessible_org_ids("root").await.unwrap_or_default();
    assert_eq!(root.len(), 4);
}

#[tokio::test]
async fn field_restrictions_follow_the_matrix() {
    let (service, _) = service_over(
        seeded().with_assignments("mara", vec![assignment("manager", Some("org-9"), None)]),
    );

    let restrictions = service
        .field_restrictions("mara", Resource::Employees)
        .await
        .unwrap_or_default();
    assert_eq!(restrictions.level("cnp"), FieldVisibility::Masked);
    assert!(restrictions.is_hidden("salary"));
    assert!(restrictions.is_visible("last_name"));
}

#[tokio::test]
async fn resolution_failure_propagates_instead_of_denying() {
    let (service, _) = service_over(FakeRoleStore {
        fail_assignments: true,
        ..seeded()
    });

    let allowed = service
        .can_perform("mara", Resource::Employees, Action::Read)
        .await;
    assert!(matches!(allowed, Err(AppError::ResolutionFailure(_))));
}

#[tokio::test]
async fn permission_state_is_fail_closed_until_loaded() {
    let (service, _) = service_over(
        seeded().with_assignments("mara", vec![assignment("manager", Some("org-9"), None)]),
    );

    let first = service
        .permission_state("mara", Resource::Employees)
        .await;
    assert!(matches!(
        first,
        Ok(ref state) if state.pending
            && Action::all().iter().all(|action| !state.allows(*action))
            && state.field_restrictions.is_hidden("last_name")
    ));

    while !matches!(service.snapshot("mara").await, Ok(RoleSnapshot::Ready(_))) {
        tokio::task::yield_now().await;
    }

    let settled = service
        .permission_state("mara", Resource::Employees)
        .await;
    assert!(matches!(
        settled,
        Ok(ref state) if !state.pending
            && state.allows(Action::Update)
            && !state.allows(Action::Delete)
            && state.field_restrictions.is_masked("cnp")
    ));
}

#[tokio::test]
async fn permission_state_stays_closed_while_a_load_is_in_flight() {
    let (service, _) = service_over(seeded());
    let source = Arc::new(GatedRoleSource::new(&["firma_admin"]));
    let service = service.with_resolver(RoleResolver::new(vec![
        source.clone() as Arc<dyn RoleSource>
    ]));

    let task = {
        let service = service.clone();
        tokio::spawn(async move { service.resolve("dana").await })
    };
    while !matches!(service.snapshot("dana").await, Ok(RoleSnapshot::Pending)) {
        tokio::task::yield_now().await;
    }

    let pending = service.permission_state("dana", Resource::Team).await;
    assert!(matches!(pending, Ok(ref state) if state.pending && !state.allows(Action::Read)));

    source.gate.notify_one();
    let resolved = task.await.unwrap_or_else(|error| panic!("load task failed: {error}"));
    assert!(resolved.is_ok());

    let settled = service.permission_state("dana", Resource::Team).await;
    assert!(matches!(settled, Ok(ref state) if !state.pending && state.allows(Action::Delete)));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn invalidation_picks_up_revoked_assignments() {
    let (service, store) = service_over(
        seeded().with_assignments("mara", vec![assignment("manager", Some("org-9"), None)]),
    );
    let _ = service.resolve("mara").await;
    let _ = service.resolve("mara").await;
    assert_eq!(store.assignment_calls(), 1);

    assert!(service.invalidate_principal("mara").await.is_ok());
    let _ = service.resolve("mara").await;
    assert_eq!(store.assignment_calls(), 2);

    assert!(service.invalidate_all().await.is_ok());
    let _ = service.resolve("mara").await;
    assert_eq!(store.assignment_calls(), 3);
}

#[tokio::test]
async fn authority_bundles_roles_primary_and_scope() {
    let (service, _) = service_over(seeded().with_assignments(
        "ana",
        vec![
            assignment("angajat", Some("org-2"), None),
            assignment("firma_admin", Some("org-1"), None),
        ],
    ));

    let authority = service.authority("ana").await;
    assert!(matches!(
        authority,
        Ok(ref value) if value.primary_role.as_ref().map(|role| role.as_str()) == Some("firma_admin")
            && value.organization_ids.len() == 2
            && value.roles.len() == 2
    ));
}
