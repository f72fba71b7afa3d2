use serde::Serialize;

use crate::models::Role;

/// Why the gate refused a request. Only used for diagnostics; page navigation
/// treats every reason the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No session, hence no role.
    Unauthenticated,
    /// A role is present but is not in the allowed set.
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// authorize
///
/// The access gate. Allows iff `role` is a member of `allowed`.
///
/// An empty `allowed` set never matches: public routes do not call the gate at all,
/// so an empty set here means the caller forgot to declare any role.
pub fn authorize(role: Option<Role>, allowed: &[Role]) -> Decision {
    match role {
        None => Decision::Deny(DenyReason::Unauthenticated),
        Some(role) if allowed.contains(&role) => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::Forbidden),
    }
}

// Role sets shared by the route table and the events API.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const MANAGER_ONLY: &[Role] = &[Role::EventManager];
pub const STAFF: &[Role] = &[Role::Admin, Role::EventManager];
