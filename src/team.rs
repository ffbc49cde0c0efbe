//! Team-scoped role checks.
//!
//! Team roles are a small enum scoped to one team membership row, separate
//! from the org-wide `Role`. Managing a team is a two-tier check: coarse org
//! policy first, then the caller's membership in that specific team. The
//! membership lookup is external and fallible; lookup failure denies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::catalog::{Action, Resource};
use crate::context::Caller;
use crate::decision::{is_authorized, Requirement};
use crate::errors::AuthResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Lead,
    Admin,
    Member,
}

impl TeamRole {
    /// Membership rows store free-form strings; anything unrecognized is a
    /// plain member.
    pub fn parse(value: &str) -> TeamRole {
        match value {
            "lead" => TeamRole::Lead,
            "admin" => TeamRole::Admin,
            _ => TeamRole::Member,
        }
    }

    pub fn can_manage(&self) -> bool {
        matches!(self, TeamRole::Lead | TeamRole::Admin)
    }
}

pub fn is_team_lead(team_role: &str) -> bool {
    TeamRole::parse(team_role) == TeamRole::Lead
}

pub fn is_team_admin(team_role: &str) -> bool {
    TeamRole::parse(team_role) == TeamRole::Admin
}

/// External team-membership lookup.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn team_role(&self, user_id: Uuid, team_id: Uuid) -> AuthResult<Option<TeamRole>>;
}

/// Directory backed by the `team_members` table.
#[derive(Clone)]
pub struct SqliteTeamDirectory {
    pool: SqlitePool,
}

impl SqliteTeamDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamDirectory for SqliteTeamDirectory {
    async fn team_role(&self, user_id: Uuid, team_id: Uuid) -> AuthResult<Option<TeamRole>> {
        let row = sqlx::query("SELECT role FROM team_members WHERE user_id = ? AND team_id = ?")
            .bind(user_id.to_string())
            .bind(team_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| TeamRole::parse(r.get::<&str, _>("role"))))
    }
}

/// True if the caller may manage the given team: org-level team management
/// permission, or lead/admin membership in that team. Pre-loaded memberships
/// on the caller are trusted; otherwise the directory is consulted, and a
/// directory failure resolves to deny.
pub async fn can_manage_team(
    directory: &dyn TeamDirectory,
    caller: &Caller,
    team_id: Uuid,
) -> bool {
    let org_tier = is_authorized(
        &caller.roles,
        &Requirement::permission(Resource::Team, Action::Manage),
    )
    .map(|decision| decision.allowed)
    .unwrap_or(false);
    if org_tier {
        return true;
    }

    if let Some(role) = caller.team_role(team_id) {
        return role.can_manage();
    }

    match directory.team_role(caller.user_id, team_id).await {
        Ok(Some(role)) => role.can_manage(),
        Ok(None) => false,
        Err(err) => {
            tracing::warn!(
                user_id = %caller.user_id,
                team_id = %team_id,
                error = %err,
                "team membership lookup failed, denying"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Role;
    use crate::errors::AuthError;

    struct EmptyDirectory;

    #[async_trait]
    impl TeamDirectory for EmptyDirectory {
        async fn team_role(&self, _user_id: Uuid, _team_id: Uuid) -> AuthResult<Option<TeamRole>> {
            Ok(None)
        }
    }

    struct BrokenDirectory;

    #[async_trait]
    impl TeamDirectory for BrokenDirectory {
        async fn team_role(&self, _user_id: Uuid, _team_id: Uuid) -> AuthResult<Option<TeamRole>> {
            Err(AuthError::internal("directory unavailable"))
        }
    }

    #[test]
    fn team_role_strings_parse_conservatively() {
        assert!(is_team_lead("lead"));
        assert!(!is_team_lead("admin"));
        assert!(is_team_admin("admin"));
        assert!(!is_team_admin("Lead"));
        assert_eq!(TeamRole::parse("anything-else"), TeamRole::Member);
    }

    #[tokio::test]
    async fn org_admin_manages_any_team() {
        let caller = Caller::new(Uuid::new_v4()).with_role(Role::Admin);
        assert!(can_manage_team(&EmptyDirectory, &caller, Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn team_lead_manages_own_team_only() {
        let team_id = Uuid::new_v4();
        let caller = Caller::new(Uuid::new_v4())
            .with_role(Role::User)
            .with_team_membership(team_id, TeamRole::Lead);

        assert!(can_manage_team(&EmptyDirectory, &caller, team_id).await);
        assert!(!can_manage_team(&EmptyDirectory, &caller, Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn lookup_failure_denies() {
        let caller = Caller::new(Uuid::new_v4()).with_role(Role::User);
        assert!(!can_manage_team(&BrokenDirectory, &caller, Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn plain_member_cannot_manage() {
        let team_id = Uuid::new_v4();
        let caller = Caller::new(Uuid::new_v4())
            .with_role(Role::User)
            .with_team_membership(team_id, TeamRole::Member);
        assert!(!can_manage_team(&EmptyDirectory, &caller, team_id).await);
    }
}
