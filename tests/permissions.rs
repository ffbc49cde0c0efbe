use anyhow::Result;
use tenant_authz::{
    is_authorized, resolve_permissions, resolve_role_str, validate_catalogs, Action, Permission,
    Requirement, Resource, Role,
};

#[test]
fn catalogs_validate_at_startup() -> Result<()> {
    validate_catalogs()?;
    Ok(())
}

#[test]
fn role_hierarchy_is_monotonic() {
    // each tier's effective set contains the tier below it
    let viewer = resolve_permissions(Role::Viewer);
    let user = resolve_permissions(Role::User);
    let manager = resolve_permissions(Role::Manager);
    let admin = resolve_permissions(Role::Admin);
    let superadmin = resolve_permissions(Role::Superadmin);

    assert!(user.is_superset_of(&viewer));
    assert!(manager.is_superset_of(&user));
    assert!(admin.is_superset_of(&manager));
    assert!(superadmin.is_superset_of(&admin));
}

#[test]
fn provider_token_is_the_only_superadmin_carve_out() {
    let admin = resolve_permissions(Role::Admin);
    let superadmin = resolve_permissions(Role::Superadmin);
    let token = Permission::new(Resource::Deepgram, Action::Token);

    assert!(superadmin.contains_permission(token));
    assert!(!admin.contains_permission(token));

    // every declared role below superadmin lacks it
    for role in [Role::Admin, Role::Owner, Role::Manager, Role::User, Role::Viewer] {
        assert!(
            !resolve_permissions(role).contains_permission(token),
            "{role} must not mint provider tokens"
        );
    }
}

#[test]
fn owner_and_admin_resolve_identically() {
    assert_eq!(resolve_permissions(Role::Owner), resolve_permissions(Role::Admin));
}

#[test]
fn viewer_is_strictly_read_only() {
    for permission in resolve_permissions(Role::Viewer).iter() {
        assert_eq!(
            permission.action,
            Action::Read,
            "viewer holds non-read permission {permission}"
        );
    }
}

#[test]
fn unknown_role_is_denied_everywhere() -> Result<()> {
    assert!(resolve_role_str("intern").is_empty());

    for resource in Resource::ALL {
        for action in resource.actions() {
            let requirement = Requirement::permission(resource, *action);
            let decision = is_authorized(&[], &requirement)?;
            assert!(!decision.allowed, "empty role set was allowed {resource}:{action}");
        }
    }
    Ok(())
}

#[test]
fn manager_chat_scenario() -> Result<()> {
    let decision = is_authorized(&[Role::Manager], &Requirement::policy("chat:organization"))?;
    assert!(!decision.allowed);
    assert!(decision.sufficient_roles.contains(&Role::Superadmin));
    assert!(decision.sufficient_roles.contains(&Role::Admin));
    assert!(decision.sufficient_roles.contains(&Role::Owner));
    assert!(!decision.sufficient_roles.contains(&Role::Manager));
    assert!(!decision.sufficient_roles.contains(&Role::User));
    assert!(!decision.sufficient_roles.contains(&Role::Viewer));

    // project-scoped chat is within the manager's groups
    let decision = is_authorized(&[Role::Manager], &Requirement::policy("chat:project"))?;
    assert!(decision.allowed);
    Ok(())
}

#[test]
fn viewer_project_scenario() -> Result<()> {
    let read = is_authorized(&[Role::Viewer], &Requirement::policy("project:read"))?;
    assert!(read.allowed);

    let update = is_authorized(&[Role::Viewer], &Requirement::policy("project:update"))?;
    assert!(!update.allowed);
    Ok(())
}

#[test]
fn decisions_are_recomputed_consistently() -> Result<()> {
    // same inputs, same outputs, across repeated calls
    for _ in 0..3 {
        let decision = is_authorized(&[Role::User], &Requirement::policy("recording:create"))?;
        assert!(decision.allowed);
        assert_eq!(
            decision.sufficient_roles,
            vec![Role::Superadmin, Role::Admin, Role::Owner, Role::Manager, Role::User]
        );
    }
    Ok(())
}
