//! Authorization groups and the role-to-group assignment table.
//!
//! A group is a named, categorized bundle of permissions; a role is an
//! ordered list of groups. Both tables are process-wide immutable constants.
//! `validate_catalogs` checks their internal consistency and should run once
//! at startup (it is also exercised by the test suite).

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::catalog::{Action, Permission, Resource, Role};
use crate::errors::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCategory {
    Content,
    User,
    Organization,
    System,
    Integration,
    Communication,
    Audit,
}

impl fmt::Display for GroupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupCategory::Content => "content",
            GroupCategory::User => "user",
            GroupCategory::Organization => "organization",
            GroupCategory::System => "system",
            GroupCategory::Integration => "integration",
            GroupCategory::Communication => "communication",
            GroupCategory::Audit => "audit",
        };
        f.write_str(name)
    }
}

/// Named bundle of permissions. Static data only.
#[derive(Debug, Serialize)]
pub struct AuthorizationGroup {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: GroupCategory,
    pub permissions: &'static [(Resource, &'static [Action])],
}

impl AuthorizationGroup {
    pub fn grants(&self, resource: Resource, action: Action) -> bool {
        self.permissions
            .iter()
            .any(|(r, actions)| *r == resource && actions.contains(&action))
    }
}

pub static CONTENT_VIEWER: AuthorizationGroup = AuthorizationGroup {
    id: "content-viewer",
    name: "Content Viewer",
    description: "Read access to projects, recordings, tasks and org instructions",
    category: GroupCategory::Content,
    permissions: &[
        (Resource::Project, &[Action::Read]),
        (Resource::Recording, &[Action::Read]),
        (Resource::Task, &[Action::Read]),
        (Resource::OrgInstruction, &[Action::Read]),
    ],
};

pub static CONTENT_EDITOR: AuthorizationGroup = AuthorizationGroup {
    id: "content-editor",
    name: "Content Editor",
    description: "Create and update projects and recordings, full task editing",
    category: GroupCategory::Content,
    permissions: &[
        (Resource::Project, &[Action::Create, Action::Update]),
        (Resource::Recording, &[Action::Create, Action::Update]),
        (Resource::Task, &[Action::Create, Action::Update, Action::Delete]),
    ],
};

pub static CONTENT_ADMIN: AuthorizationGroup = AuthorizationGroup {
    id: "content-admin",
    name: "Content Administrator",
    description: "Delete projects and recordings, manage org instructions",
    category: GroupCategory::Content,
    permissions: &[
        (Resource::Project, &[Action::Delete]),
        (Resource::Recording, &[Action::Delete]),
        (Resource::OrgInstruction, &[Action::Create, Action::Update, Action::Delete]),
    ],
};

pub static MEMBER_DIRECTORY: AuthorizationGroup = AuthorizationGroup {
    id: "member-directory",
    name: "Member Directory",
    description: "See who belongs to the organization",
    category: GroupCategory::User,
    permissions: &[(Resource::User, &[Action::Read])],
};

pub static USER_MANAGER: AuthorizationGroup = AuthorizationGroup {
    id: "user-manager",
    name: "User Manager",
    description: "Manage members and their invitations",
    category: GroupCategory::User,
    permissions: &[
        (Resource::User, &[Action::Update, Action::Delete, Action::Manage]),
        (
            Resource::Invitation,
            &[Action::Create, Action::Read, Action::Delete, Action::Cancel],
        ),
    ],
};

pub static ORG_VIEWER: AuthorizationGroup = AuthorizationGroup {
    id: "org-viewer",
    name: "Organization Viewer",
    description: "Read access to organization, teams and onboarding state",
    category: GroupCategory::Organization,
    permissions: &[
        (Resource::Organization, &[Action::Read]),
        (Resource::Team, &[Action::Read]),
        (Resource::Onboarding, &[Action::Read]),
    ],
};

pub static TEAM_MANAGER: AuthorizationGroup = AuthorizationGroup {
    id: "team-manager",
    name: "Team Manager",
    description: "Create and manage teams",
    category: GroupCategory::Organization,
    permissions: &[(
        Resource::Team,
        &[Action::Create, Action::Update, Action::Delete, Action::Manage],
    )],
};

pub static ORG_MANAGER: AuthorizationGroup = AuthorizationGroup {
    id: "org-manager",
    name: "Organization Manager",
    description: "Update organization settings and onboarding",
    category: GroupCategory::Organization,
    permissions: &[
        (Resource::Organization, &[Action::Update, Action::Manage]),
        (Resource::Onboarding, &[Action::Update]),
    ],
};

pub static ORG_OWNER: AuthorizationGroup = AuthorizationGroup {
    id: "org-owner",
    name: "Organization Owner",
    description: "Delete the organization",
    category: GroupCategory::Organization,
    permissions: &[(Resource::Organization, &[Action::Delete])],
};

pub static SETTINGS_MANAGER: AuthorizationGroup = AuthorizationGroup {
    id: "settings-manager",
    name: "Settings Manager",
    description: "Read and change workspace settings",
    category: GroupCategory::System,
    permissions: &[(Resource::Setting, &[Action::Read, Action::Update])],
};

pub static SYSTEM_ADMIN: AuthorizationGroup = AuthorizationGroup {
    id: "system-admin",
    name: "System Administrator",
    description: "Organization-level admin surface",
    category: GroupCategory::System,
    permissions: &[(Resource::Admin, &[Action::All])],
};

// deepgram:token lives here and nowhere else: provider API tokens are a
// platform concern, withheld even from org admins.
pub static PLATFORM_ADMIN: AuthorizationGroup = AuthorizationGroup {
    id: "platform-admin",
    name: "Platform Administrator",
    description: "Cross-organization platform surface and provider tokens",
    category: GroupCategory::System,
    permissions: &[
        (Resource::Superadmin, &[Action::All]),
        (Resource::Deepgram, &[Action::Token]),
    ],
};

pub static INTEGRATION_MANAGER: AuthorizationGroup = AuthorizationGroup {
    id: "integration-manager",
    name: "Integration Manager",
    description: "Manage third-party integrations and transcription status",
    category: GroupCategory::Integration,
    permissions: &[
        (Resource::Integration, &[Action::Read, Action::Manage]),
        (Resource::Deepgram, &[Action::Read]),
    ],
};

pub static CHAT_PROJECT: AuthorizationGroup = AuthorizationGroup {
    id: "chat-project",
    name: "Project Chat",
    description: "AI chat over a single project's transcripts",
    category: GroupCategory::Communication,
    permissions: &[(Resource::Chat, &[Action::Project])],
};

pub static CHAT_ORGANIZATION: AuthorizationGroup = AuthorizationGroup {
    id: "chat-organization",
    name: "Organization Chat",
    description: "AI chat across all transcripts in the organization",
    category: GroupCategory::Communication,
    permissions: &[(Resource::Chat, &[Action::Organization])],
};

pub static AUDIT_VIEWER: AuthorizationGroup = AuthorizationGroup {
    id: "audit-viewer",
    name: "Audit Viewer",
    description: "Read the audit log",
    category: GroupCategory::Audit,
    permissions: &[(Resource::AuditLog, &[Action::Read])],
};

/// Every declared group.
pub static GROUPS: [&AuthorizationGroup; 16] = [
    &CONTENT_VIEWER,
    &CONTENT_EDITOR,
    &CONTENT_ADMIN,
    &MEMBER_DIRECTORY,
    &USER_MANAGER,
    &ORG_VIEWER,
    &TEAM_MANAGER,
    &ORG_MANAGER,
    &ORG_OWNER,
    &SETTINGS_MANAGER,
    &SYSTEM_ADMIN,
    &PLATFORM_ADMIN,
    &INTEGRATION_MANAGER,
    &CHAT_PROJECT,
    &CHAT_ORGANIZATION,
    &AUDIT_VIEWER,
];

static VIEWER_GROUPS: [&AuthorizationGroup; 3] = [&CONTENT_VIEWER, &ORG_VIEWER, &MEMBER_DIRECTORY];

static USER_GROUPS: [&AuthorizationGroup; 5] = [
    &CONTENT_VIEWER,
    &ORG_VIEWER,
    &MEMBER_DIRECTORY,
    &CONTENT_EDITOR,
    &CHAT_PROJECT,
];

static MANAGER_GROUPS: [&AuthorizationGroup; 7] = [
    &CONTENT_VIEWER,
    &ORG_VIEWER,
    &MEMBER_DIRECTORY,
    &CONTENT_EDITOR,
    &CHAT_PROJECT,
    &CONTENT_ADMIN,
    &TEAM_MANAGER,
];

static ADMIN_GROUPS: [&AuthorizationGroup; 15] = [
    &CONTENT_VIEWER,
    &ORG_VIEWER,
    &MEMBER_DIRECTORY,
    &CONTENT_EDITOR,
    &CHAT_PROJECT,
    &CONTENT_ADMIN,
    &TEAM_MANAGER,
    &USER_MANAGER,
    &ORG_MANAGER,
    &ORG_OWNER,
    &SETTINGS_MANAGER,
    &INTEGRATION_MANAGER,
    &CHAT_ORGANIZATION,
    &AUDIT_VIEWER,
    &SYSTEM_ADMIN,
];

static SUPERADMIN_GROUPS: [&AuthorizationGroup; 16] = [
    &CONTENT_VIEWER,
    &ORG_VIEWER,
    &MEMBER_DIRECTORY,
    &CONTENT_EDITOR,
    &CHAT_PROJECT,
    &CONTENT_ADMIN,
    &TEAM_MANAGER,
    &USER_MANAGER,
    &ORG_MANAGER,
    &ORG_OWNER,
    &SETTINGS_MANAGER,
    &INTEGRATION_MANAGER,
    &CHAT_ORGANIZATION,
    &AUDIT_VIEWER,
    &SYSTEM_ADMIN,
    &PLATFORM_ADMIN,
];

/// Role-to-group assignment table. `Owner` deliberately shares `Admin`'s
/// list: the product treats owner as an alias tier, not a distinct one.
pub fn groups_for(role: Role) -> &'static [&'static AuthorizationGroup] {
    match role {
        Role::Superadmin => &SUPERADMIN_GROUPS,
        Role::Admin | Role::Owner => &ADMIN_GROUPS,
        Role::Manager => &MANAGER_GROUPS,
        Role::User => &USER_GROUPS,
        Role::Viewer => &VIEWER_GROUPS,
    }
}

/// Consistency check over the static tables: unique group ids, every group
/// permission declared in the policy catalog, every role assigned at least
/// one group.
pub fn validate_catalogs() -> AuthResult<()> {
    let mut seen = HashSet::new();
    for group in GROUPS {
        if !seen.insert(group.id) {
            return Err(AuthError::validation(format!("duplicate group id: {}", group.id)));
        }
        if group.permissions.is_empty() {
            return Err(AuthError::validation(format!("group {} grants nothing", group.id)));
        }
        for (resource, actions) in group.permissions {
            for action in *actions {
                let permission = Permission::new(*resource, *action);
                if !permission.is_declared() {
                    return Err(AuthError::validation(format!(
                        "group {} references undeclared permission {permission}",
                        group.id
                    )));
                }
            }
        }
    }

    for role in Role::ALL {
        if groups_for(role).is_empty() {
            return Err(AuthError::validation(format!("role {role} has no groups assigned")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_are_internally_consistent() {
        validate_catalogs().unwrap();
    }

    #[test]
    fn owner_aliases_admin() {
        let admin: Vec<_> = groups_for(Role::Admin).iter().map(|g| g.id).collect();
        let owner: Vec<_> = groups_for(Role::Owner).iter().map(|g| g.id).collect();
        assert_eq!(admin, owner);
    }

    #[test]
    fn provider_token_is_platform_only() {
        for group in GROUPS {
            let grants_token = group.grants(Resource::Deepgram, Action::Token);
            assert_eq!(grants_token, group.id == "platform-admin");
        }
    }

    #[test]
    fn every_assigned_group_is_declared() {
        for role in Role::ALL {
            for group in groups_for(role) {
                assert!(GROUPS.iter().any(|g| g.id == group.id));
            }
        }
    }
}
