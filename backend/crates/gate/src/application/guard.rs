//! Portal Guard
//!
//! The admission state machine for one mounted portal. Pure and
//! synchronous: the caller feeds it session events and lookup outcomes and
//! performs the lookups it asks for (see [`crate::application::mount`]).
//!
//! Every lookup is tagged with the generation current when it was issued.
//! Any session change advances the generation, so a result that arrives
//! after a newer event is recognised as stale and dropped.

use crate::domain::capability::{Capability, can};
use crate::domain::entity::{
    guard_state::{DenyReason, GuardState},
    role_record::RoleRecord,
    session::SessionEvent,
};
use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag, uid::Uid};

/// A role lookup the guard wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub uid: Uid,
    pub generation: u64,
}

/// What a role lookup produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(RoleRecord),
    NotFound,
    Failed(String),
    TimedOut,
}

#[derive(Debug)]
pub struct PortalGuard {
    portal: PortalId,
    state: GuardState,
    generation: u64,
}

impl PortalGuard {
    pub fn new(portal: PortalId) -> Self {
        Self {
            portal,
            state: GuardState::Unknown,
            generation: 0,
        }
    }

    pub fn portal(&self) -> PortalId {
        self.portal
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The lookup currently awaited, if the guard is checking a role
    pub fn pending(&self) -> Option<LookupTicket> {
        match &self.state {
            GuardState::CheckingRole { uid } => Some(LookupTicket {
                uid: uid.clone(),
                generation: self.generation,
            }),
            _ => None,
        }
    }

    /// Apply a session event. Returns the lookup to issue, if any.
    pub fn on_session(&mut self, event: SessionEvent) -> Option<LookupTicket> {
        match event {
            SessionEvent::SignedOut => {
                if matches!(self.state, GuardState::CheckingRole { .. }) {
                    tracing::debug!(portal = %self.portal, "Discarding in-flight role lookup");
                }
                self.generation += 1;
                self.state = GuardState::SignedOut;
                None
            }
            SessionEvent::SignedIn(uid) => {
                if self.state.uid() == Some(&uid) {
                    tracing::debug!(portal = %self.portal, uid = %uid, "Session unchanged");
                    return None;
                }

                self.generation += 1;
                self.state = GuardState::CheckingRole { uid: uid.clone() };
                Some(LookupTicket {
                    uid,
                    generation: self.generation,
                })
            }
        }
    }

    /// Apply a lookup result. Returns `false` when the result was stale and
    /// ignored.
    pub fn on_lookup(&mut self, ticket: &LookupTicket, outcome: LookupOutcome) -> bool {
        let current = matches!(
            &self.state,
            GuardState::CheckingRole { uid } if *uid == ticket.uid
        );
        if ticket.generation != self.generation || !current {
            tracing::debug!(
                portal = %self.portal,
                uid = %ticket.uid,
                generation = ticket.generation,
                current_generation = self.generation,
                "Dropping stale role lookup"
            );
            return false;
        }

        self.state = decide(self.portal, ticket.uid.clone(), outcome);

        match &self.state {
            GuardState::Authorized { uid, role } => {
                tracing::info!(portal = %self.portal, uid = %uid, role = %role, "Portal access granted");
            }
            GuardState::Denied { uid, reason } => match reason {
                DenyReason::LookupFailed | DenyReason::LookupTimedOut => {
                    tracing::warn!(portal = %self.portal, uid = %uid, reason = %reason, "Portal access denied");
                }
                _ => {
                    tracing::info!(portal = %self.portal, uid = %uid, reason = %reason, "Portal access denied");
                }
            },
            _ => {}
        }

        true
    }
}

/// Admission decision for a finished lookup
pub fn decide(portal: PortalId, uid: Uid, outcome: LookupOutcome) -> GuardState {
    let role = match outcome {
        LookupOutcome::Found(record) => record.role_tag(),
        LookupOutcome::NotFound => Err(DenyReason::MissingRoleRecord),
        LookupOutcome::Failed(message) => {
            tracing::warn!(portal = %portal, uid = %uid, error = %message, "Role lookup failed");
            Err(DenyReason::LookupFailed)
        }
        LookupOutcome::TimedOut => Err(DenyReason::LookupTimedOut),
    };

    match role.and_then(|role| admit(portal, role)) {
        Ok(role) => GuardState::Authorized { uid, role },
        Err(reason) => GuardState::Denied { uid, reason },
    }
}

/// `role ∈ allowedRoles(portal)`, the entire rule
fn admit(portal: PortalId, role: RoleTag) -> Result<RoleTag, DenyReason> {
    if can(role, Capability::EnterPortal(portal)) {
        Ok(role)
    } else {
        Err(DenyReason::RoleNotAllowed(role))
    }
}
