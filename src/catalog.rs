//! Policy catalog - the closed sets of roles, resources and actions.
//!
//! Everything here is static declarative data. Adding a resource or action
//! means extending these enums and the groups that reference them; nothing is
//! created or mutated at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, AuthResult};

/// Organization-level role of a caller. One per org membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    /// Alias tier for `Admin`: identical group assignment.
    Owner,
    Manager,
    User,
    Viewer,
}

impl Role {
    /// All declared roles, highest privilege first.
    pub const ALL: [Role; 6] = [
        Role::Superadmin,
        Role::Admin,
        Role::Owner,
        Role::Manager,
        Role::User,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Viewer => "viewer",
        }
    }

    /// Parse a stored role string. Unknown strings yield `None` so that
    /// downstream resolution degrades to the empty permission set rather
    /// than failing the request.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "superadmin" => Some(Role::Superadmin),
            "admin" => Some(Role::Admin),
            "owner" => Some(Role::Owner),
            "manager" => Some(Role::Manager),
            "user" => Some(Role::User),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protected entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Project,
    Recording,
    Task,
    Organization,
    Team,
    User,
    Chat,
    Setting,
    Integration,
    Deepgram,
    OrgInstruction,
    AuditLog,
    Onboarding,
    Invitation,
    Admin,
    Superadmin,
}

impl Resource {
    pub const ALL: [Resource; 16] = [
        Resource::Project,
        Resource::Recording,
        Resource::Task,
        Resource::Organization,
        Resource::Team,
        Resource::User,
        Resource::Chat,
        Resource::Setting,
        Resource::Integration,
        Resource::Deepgram,
        Resource::OrgInstruction,
        Resource::AuditLog,
        Resource::Onboarding,
        Resource::Invitation,
        Resource::Admin,
        Resource::Superadmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Project => "project",
            Resource::Recording => "recording",
            Resource::Task => "task",
            Resource::Organization => "organization",
            Resource::Team => "team",
            Resource::User => "user",
            Resource::Chat => "chat",
            Resource::Setting => "setting",
            Resource::Integration => "integration",
            Resource::Deepgram => "deepgram",
            Resource::OrgInstruction => "org_instruction",
            Resource::AuditLog => "audit_log",
            Resource::Onboarding => "onboarding",
            Resource::Invitation => "invitation",
            Resource::Admin => "admin",
            Resource::Superadmin => "superadmin",
        }
    }

    pub fn parse(value: &str) -> Option<Resource> {
        Resource::ALL.iter().copied().find(|r| r.as_str() == value)
    }

    /// The closed action set for this resource (the policy catalog proper).
    /// An action string is only meaningful in the context of its resource.
    pub fn actions(&self) -> &'static [Action] {
        use Action::*;
        match self {
            Resource::Project => &[Create, Read, Update, Delete],
            Resource::Recording => &[Create, Read, Update, Delete],
            Resource::Task => &[Create, Read, Update, Delete],
            Resource::Organization => &[Read, Update, Delete, Manage],
            Resource::Team => &[Create, Read, Update, Delete, Manage],
            Resource::User => &[Read, Update, Delete, Manage],
            Resource::Chat => &[Project, Organization],
            Resource::Setting => &[Read, Update],
            Resource::Integration => &[Read, Manage],
            Resource::Deepgram => &[Read, Token],
            Resource::OrgInstruction => &[Create, Read, Update, Delete],
            Resource::AuditLog => &[Read],
            Resource::Onboarding => &[Read, Update],
            Resource::Invitation => &[Create, Read, Delete, Cancel],
            Resource::Admin => &[All],
            Resource::Superadmin => &[All],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations on resources. Validity of an (action, resource) pairing is
/// defined by `Resource::actions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
    Cancel,
    /// Chat scoped to a single project's transcripts.
    Project,
    /// Chat across every transcript in the organization.
    Organization,
    /// Mint a transcription-provider API token.
    Token,
    All,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
            Action::Cancel => "cancel",
            Action::Project => "project",
            Action::Organization => "organization",
            Action::Token => "token",
            Action::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Action> {
        match value {
            "create" => Some(Action::Create),
            "read" => Some(Action::Read),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            "manage" => Some(Action::Manage),
            "cancel" => Some(Action::Cancel),
            "project" => Some(Action::Project),
            "organization" => Some(Action::Organization),
            "token" => Some(Action::Token),
            "all" => Some(Action::All),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (resource, action) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Whether this pair exists in the policy catalog.
    pub fn is_declared(&self) -> bool {
        self.resource.actions().contains(&self.action)
    }

    /// Parse a policy key of the form `"resource:action"`, e.g.
    /// `"chat:organization"`. Unknown or undeclared pairs are a validation
    /// error, not a silent deny: a bad key is a programming mistake in the
    /// operation declaration, not a caller-permission outcome.
    pub fn parse_key(key: &str) -> AuthResult<Permission> {
        let (resource, action) = key
            .split_once(':')
            .ok_or_else(|| AuthError::validation(format!("malformed policy key: {key:?}")))?;
        let resource = Resource::parse(resource)
            .ok_or_else(|| AuthError::validation(format!("unknown resource in policy key: {key:?}")))?;
        let action = Action::parse(action)
            .ok_or_else(|| AuthError::validation(format!("unknown action in policy key: {key:?}")))?;
        let permission = Permission::new(resource, action);
        if !permission.is_declared() {
            return Err(AuthError::validation(format!(
                "action {action} is not declared for resource {resource}"
            )));
        }
        Ok(permission)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn policy_key_parses_declared_pairs() {
        let p = Permission::parse_key("chat:organization").unwrap();
        assert_eq!(p.resource, Resource::Chat);
        assert_eq!(p.action, Action::Organization);
    }

    #[test]
    fn policy_key_rejects_undeclared_pairs() {
        assert!(Permission::parse_key("audit_log:delete").is_err());
        assert!(Permission::parse_key("chat:read").is_err());
        assert!(Permission::parse_key("nonsense").is_err());
        assert!(Permission::parse_key("widget:read").is_err());
    }

    #[test]
    fn every_resource_has_a_nonempty_action_set() {
        for resource in Resource::ALL {
            assert!(!resource.actions().is_empty(), "{resource} has no actions");
        }
    }
}
