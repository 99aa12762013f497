//! Guard State Entity
//!
//! Per-mount state of a portal guard. Created when a guarded subtree mounts
//! and discarded when it unmounts.

use std::fmt;

use crate::domain::value_object::{role_tag::RoleTag, uid::Uid};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Mounted, no session event seen yet
    Unknown,
    /// Signed in; role lookup for `uid` in flight
    CheckingRole { uid: Uid },
    Authorized { uid: Uid, role: RoleTag },
    Denied { uid: Uid, reason: DenyReason },
    SignedOut,
}

impl GuardState {
    /// True once the guard can render or redirect
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            GuardState::Authorized { .. } | GuardState::Denied { .. } | GuardState::SignedOut
        )
    }

    pub fn uid(&self) -> Option<&Uid> {
        match self {
            GuardState::CheckingRole { uid }
            | GuardState::Authorized { uid, .. }
            | GuardState::Denied { uid, .. } => Some(uid),
            GuardState::Unknown | GuardState::SignedOut => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            GuardState::Unknown => "unknown",
            GuardState::CheckingRole { .. } => "checking_role",
            GuardState::Authorized { .. } => "authorized",
            GuardState::Denied { .. } => "denied",
            GuardState::SignedOut => "signed_out",
        }
    }
}

/// Why a signed-in caller was denied. Diagnostics only; never shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    RoleNotAllowed(RoleTag),
    MissingRoleRecord,
    MissingRoleField,
    UnrecognizedRole(String),
    LookupFailed,
    LookupTimedOut,
}

impl DenyReason {
    /// The caller's role, when it is known
    pub fn role(&self) -> Option<RoleTag> {
        match self {
            DenyReason::RoleNotAllowed(role) => Some(*role),
            _ => None,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::RoleNotAllowed(role) => write!(f, "role {role} not allowed"),
            DenyReason::MissingRoleRecord => f.write_str("no role record"),
            DenyReason::MissingRoleField => f.write_str("role record has no role"),
            DenyReason::UnrecognizedRole(code) => write!(f, "unrecognized role {code:?}"),
            DenyReason::LookupFailed => f.write_str("role lookup failed"),
            DenyReason::LookupTimedOut => f.write_str("role lookup timed out"),
        }
    }
}
