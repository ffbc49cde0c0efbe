//! Organization-scope guard.
//!
//! Authorization alone never implies the resource belongs to the caller's
//! organization; this companion check enforces tenancy. "Not found" and
//! "found but foreign tenant" collapse to one identical reason string so
//! denials cannot be used to probe which resource ids exist.

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::Role;
use crate::context::Caller;
use crate::decision::{is_authorized, Requirement};
use crate::errors::AuthResult;

/// The single reason exposed for both a missing resource and a cross-tenant
/// resource. Must stay byte-identical between the two paths.
pub const REASON_NOT_FOUND: &str = "Resource not found";
pub const REASON_FORBIDDEN: &str = "Insufficient permissions";

/// Implemented by any resource row that carries its owning organization.
pub trait OrgScoped {
    fn organization_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessCheck {
    pub can_access: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Server-side diagnostics only; never shown to the end user.
    pub sufficient_roles: Vec<Role>,
}

impl AccessCheck {
    fn granted(sufficient_roles: Vec<Role>) -> Self {
        Self { can_access: true, reason: None, sufficient_roles }
    }

    fn denied(reason: &'static str, sufficient_roles: Vec<Role>) -> Self {
        Self { can_access: false, reason: Some(reason), sufficient_roles }
    }
}

/// Three-step guard: existence, permission, tenancy. Internal logs may
/// distinguish the deny causes; the returned reason must not distinguish
/// missing from foreign-tenant.
pub fn can_access_resource<R: OrgScoped>(
    caller: &Caller,
    resource: Option<&R>,
    requirement: &Requirement,
) -> AuthResult<AccessCheck> {
    let Some(resource) = resource else {
        tracing::debug!(user_id = %caller.user_id, "access denied: resource missing");
        return Ok(AccessCheck::denied(REASON_NOT_FOUND, Vec::new()));
    };

    let decision = is_authorized(&caller.roles, requirement)?;
    if !decision.allowed {
        tracing::debug!(
            user_id = %caller.user_id,
            sufficient_roles = ?decision.sufficient_roles,
            "access denied: insufficient permissions"
        );
        return Ok(AccessCheck::denied(REASON_FORBIDDEN, decision.sufficient_roles));
    }

    if caller.organization_id != Some(resource.organization_id()) {
        tracing::debug!(
            user_id = %caller.user_id,
            resource_org = %resource.organization_id(),
            "access denied: cross-tenant resource"
        );
        return Ok(AccessCheck::denied(REASON_NOT_FOUND, decision.sufficient_roles));
    }

    Ok(AccessCheck::granted(decision.sufficient_roles))
}
