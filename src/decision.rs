//! Authorization decision procedure.
//!
//! Recomputed from the static catalogs on every call; callers that need
//! throughput should memoize per-role resolved sets (they are static), never
//! per-request decisions.

use serde::Serialize;

use crate::catalog::{Action, Permission, Resource, Role};
use crate::errors::{AuthError, AuthResult};
use crate::resolver::resolve_permissions;

/// What an operation declares it requires: either a single policy key
/// (`"resource:action"` sugar) or a permission object listing pairs the
/// caller must hold in full.
#[derive(Debug, Clone)]
pub enum Requirement {
    Policy(String),
    Permissions(Vec<(Resource, Vec<Action>)>),
}

impl Requirement {
    pub fn policy(key: impl Into<String>) -> Self {
        Self::Policy(key.into())
    }

    pub fn permission(resource: Resource, action: Action) -> Self {
        Self::Permissions(vec![(resource, vec![action])])
    }

    /// Flatten into the concrete pairs a caller must hold. Undeclared pairs
    /// are a validation error regardless of which form declared them.
    fn required_permissions(&self) -> AuthResult<Vec<Permission>> {
        match self {
            Requirement::Policy(key) => Ok(vec![Permission::parse_key(key)?]),
            Requirement::Permissions(entries) => {
                if entries.is_empty() || entries.iter().all(|(_, actions)| actions.is_empty()) {
                    return Err(AuthError::validation("requirement declares no permissions"));
                }
                let mut required = Vec::new();
                for (resource, actions) in entries {
                    for action in actions {
                        let permission = Permission::new(*resource, *action);
                        if !permission.is_declared() {
                            return Err(AuthError::validation(format!(
                                "requirement references undeclared permission {permission}"
                            )));
                        }
                        required.push(permission);
                    }
                }
                Ok(required)
            }
        }
    }
}

/// Outcome of an authorization check. `sufficient_roles` is for server-side
/// diagnostics and logging only; user-facing messaging must stay generic.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub sufficient_roles: Vec<Role>,
}

/// Decide whether any of the caller's roles satisfies the requirement.
///
/// `sufficient_roles` is every declared role whose resolved permission set
/// contains all required pairs; `allowed` is whether the caller holds one of
/// them. An empty caller role list is always denied.
pub fn is_authorized(caller_roles: &[Role], requirement: &Requirement) -> AuthResult<Decision> {
    let required = requirement.required_permissions()?;

    let sufficient_roles: Vec<Role> = Role::ALL
        .iter()
        .copied()
        .filter(|role| {
            let resolved = resolve_permissions(*role);
            required.iter().all(|p| resolved.contains_permission(*p))
        })
        .collect();

    let allowed = caller_roles.iter().any(|role| sufficient_roles.contains(role));

    tracing::debug!(
        caller_roles = ?caller_roles,
        required = ?required.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        allowed,
        "authorization decision"
    );

    Ok(Decision { allowed, sufficient_roles })
}

/// Stringly-typed convenience for callers holding raw role strings.
/// Unknown strings contribute nothing (deny-by-default).
pub fn is_authorized_strs(caller_roles: &[&str], requirement: &Requirement) -> AuthResult<Decision> {
    let roles: Vec<Role> = caller_roles.iter().filter_map(|r| Role::parse(r)).collect();
    is_authorized(&roles, requirement)
}
