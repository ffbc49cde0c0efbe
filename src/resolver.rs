//! Permission resolver - flattens a role's group assignment into one merged
//! permission set. Pure functions over the static catalogs.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::{Action, Permission, Resource, Role};
use crate::groups::groups_for;

/// Merged permission set: resource -> set of actions. Duplicates collapse,
/// iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet(BTreeMap<Resource, BTreeSet<Action>>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: Resource, action: Action) {
        self.0.entry(resource).or_default().insert(action);
    }

    pub fn contains(&self, resource: Resource, action: Action) -> bool {
        self.0.get(&resource).is_some_and(|actions| actions.contains(&action))
    }

    pub fn contains_permission(&self, permission: Permission) -> bool {
        self.contains(permission.resource, permission.action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union the other set into this one (most-permissive-wins).
    pub fn union_with(&mut self, other: &PermissionSet) {
        for (resource, actions) in &other.0 {
            self.0.entry(*resource).or_default().extend(actions.iter().copied());
        }
    }

    pub fn is_superset_of(&self, other: &PermissionSet) -> bool {
        other.iter().all(|p| self.contains_permission(p))
    }

    /// Iterate every (resource, action) pair in the set.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().flat_map(|(resource, actions)| {
            actions.iter().map(|action| Permission::new(*resource, *action))
        })
    }

}

/// Resolve one role into its effective permission set.
///
/// Total and deterministic: every declared role yields a non-empty set, and
/// a role parsed from an unknown string never reaches this function (it is
/// `None` at the edge); see `resolve_role_str` for the stringly-typed path.
pub fn resolve_permissions(role: Role) -> PermissionSet {
    let mut set = PermissionSet::new();
    for group in groups_for(role) {
        for (resource, actions) in group.permissions {
            for action in *actions {
                set.insert(*resource, *action);
            }
        }
    }
    set
}

/// Resolve a caller holding several roles: each resolved independently,
/// results unioned.
pub fn resolve_roles(roles: &[Role]) -> PermissionSet {
    let mut merged = PermissionSet::new();
    for role in roles {
        merged.union_with(&resolve_permissions(*role));
    }
    merged
}

/// Stringly-typed entry point for role values coming straight from storage.
/// Unrecognized strings resolve to the empty set, deny-by-default downstream.
pub fn resolve_role_str(role: &str) -> PermissionSet {
    match Role::parse(role) {
        Some(role) => resolve_permissions(role),
        None => {
            tracing::debug!(role = %role, "unrecognized role resolves to empty permission set");
            PermissionSet::new()
        }
    }
}
