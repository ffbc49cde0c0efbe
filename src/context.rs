//! Caller context - the resolved identity handed to us by the auth layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Role;
use crate::team::TeamRole;

/// A team membership carried on the caller, when the server layer has
/// already loaded it. Team roles are scoped to one team and are distinct
/// from the org-wide `Role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team_id: Uuid,
    pub role: TeamRole,
}

/// The authenticated caller as supplied per request by the auth
/// collaborator. This crate only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub organization_id: Option<Uuid>,
    /// Normally a singleton per org membership; the general list form is
    /// supported and unioned most-permissive-wins.
    pub roles: Vec<Role>,
    pub team_memberships: Vec<TeamMembership>,
}

impl Caller {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            organization_id: None,
            roles: Vec::new(),
            team_memberships: Vec::new(),
        }
    }

    pub fn with_org(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_team_membership(mut self, team_id: Uuid, role: TeamRole) -> Self {
        self.team_memberships.push(TeamMembership { team_id, role });
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_superadmin(&self) -> bool {
        self.has_role(Role::Superadmin)
    }

    /// The caller's role in one specific team, if it was pre-loaded.
    pub fn team_role(&self, team_id: Uuid) -> Option<TeamRole> {
        self.team_memberships
            .iter()
            .find(|m| m.team_id == team_id)
            .map(|m| m.role)
    }
}
