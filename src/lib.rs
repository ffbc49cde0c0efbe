//! Role-based authorization and login-policy enforcement for multi-tenant
//! organizations.
//!
//! The permission side (catalogs, resolver, decisions, scope and team
//! guards) is pure and reads only static data; the account side persists
//! login attempts, lockouts and password history through a caller-supplied
//! sqlx pool (schema in `migrations/`). Run
//! [`groups::validate_catalogs`] once at startup.

pub mod account;
pub mod catalog;
pub mod context;
pub mod decision;
pub mod errors;
pub mod groups;
pub mod resolver;
pub mod scope;
pub mod team;

pub use catalog::{Action, Permission, Resource, Role};
pub use context::{Caller, TeamMembership};
pub use decision::{is_authorized, is_authorized_strs, Decision, Requirement};
pub use errors::{AuthError, AuthResult, ErrorKind};
pub use groups::{groups_for, validate_catalogs, AuthorizationGroup, GroupCategory, GROUPS};
pub use resolver::{resolve_permissions, resolve_role_str, resolve_roles, PermissionSet};
pub use scope::{can_access_resource, AccessCheck, OrgScoped, REASON_FORBIDDEN, REASON_NOT_FOUND};
pub use team::{can_manage_team, is_team_admin, is_team_lead, SqliteTeamDirectory, TeamDirectory, TeamRole};
