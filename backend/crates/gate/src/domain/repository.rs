//! External Collaborator Traits
//!
//! The gate consumes two providers it does not own: the identity provider
//! (sign-in, sign-out, session observation) and the role directory (the
//! `users/{uid}` documents). Implementations live in the infrastructure layer.

use std::time::Duration;

use kernel::id::SessionToken;

use crate::domain::entity::{role_record::RoleRecord, session::SessionSubscription};
use crate::domain::value_object::uid::Uid;
use crate::error::GateResult;

/// Role directory trait
#[trait_variant::make(RoleDirectory: Send)]
pub trait LocalRoleDirectory {
    /// Read the role record for `uid`; `Ok(None)` when no record exists.
    ///
    /// No cancellation and no retries: callers discard results they no
    /// longer want.
    async fn lookup(&self, uid: &Uid) -> GateResult<Option<RoleRecord>>;
}

/// A browser session that has just signed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInSession {
    pub token: SessionToken,
    pub uid: Uid,
}

/// Identity provider trait
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Authenticate and open a fresh session that expires after `ttl`.
    ///
    /// Never reuses an existing token. Fails with `InvalidCredentials` on
    /// any mismatch.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
        ttl: Duration,
    ) -> GateResult<SignedInSession>;

    /// End `session`. Returns the uid that was signed in, if any.
    async fn sign_out(&self, session: SessionToken) -> GateResult<Option<Uid>>;

    /// Observe `session`. Unknown, ended, expired or absent sessions
    /// observe "signed out".
    fn subscribe(&self, session: Option<SessionToken>) -> SessionSubscription;
}
