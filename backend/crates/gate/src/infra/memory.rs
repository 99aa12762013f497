//! In-Memory Providers
//!
//! Process-local identity provider and role directory. Used for
//! development, for the seeded demo deployment, and by the tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use kernel::id::SessionToken;
use platform::password::{ClearTextPassword, HashedPassword};

use crate::domain::entity::{
    role_record::RoleRecord,
    session::{SessionEvent, SessionPublisher, SessionSubscription},
};
use crate::domain::repository::{IdentityProvider, RoleDirectory, SignedInSession};
use crate::domain::value_object::uid::Uid;
use crate::error::{GateError, GateResult};

// ============================================================================
// Role Directory
// ============================================================================

/// `users/{uid}` documents held in memory
#[derive(Debug, Default)]
pub struct InMemoryRoleDirectory {
    records: RwLock<HashMap<Uid, RoleRecord>>,
    delays: RwLock<HashMap<Uid, Duration>>,
    failing: RwLock<HashSet<Uid>>,
    lookups: AtomicUsize,
}

impl InMemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uid: Uid, record: RoleRecord) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uid, record);
    }

    pub fn remove(&self, uid: &Uid) -> Option<RoleRecord> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uid)
    }

    /// Delay every lookup of `uid`
    pub fn set_delay(&self, uid: &Uid, delay: Duration) {
        self.delays
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uid.clone(), delay);
    }

    /// Make every lookup of `uid` fail as a transport error would
    pub fn fail_for(&self, uid: &Uid) {
        self.failing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uid.clone());
    }

    /// Lookups served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl RoleDirectory for InMemoryRoleDirectory {
    async fn lookup(&self, uid: &Uid) -> GateResult<Option<RoleRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let delay = self
            .delays
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(uid)
        {
            return Err(GateError::RoleLookup(format!("users/{uid} unavailable")));
        }

        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid)
            .cloned())
    }
}

// ============================================================================
// Identity Provider
// ============================================================================

#[derive(Debug)]
struct Account {
    uid: Uid,
    password: HashedPassword,
}

/// One open browser session
#[derive(Debug)]
struct SessionEntry {
    publisher: SessionPublisher,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Email/password accounts plus one observable state per browser session.
///
/// Sessions live until sign-out or expiry; ended and expired entries are
/// dropped, so their tokens observe "signed out" from then on.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<SessionToken, SessionEntry>>,
    pepper: Option<Vec<u8>>,
}

impl InMemoryIdentityProvider {
    pub fn new(pepper: Option<Vec<u8>>) -> Self {
        Self {
            pepper,
            ..Self::default()
        }
    }

    /// Register an account, hashing `password` with Argon2id
    pub fn add_account(&self, email: &str, password: &str, uid: Uid) -> GateResult<()> {
        let password = ClearTextPassword::new(password.to_string())?;
        let hashed = password
            .hash(self.pepper.as_deref())
            .map_err(|e| GateError::Internal(e.to_string()))?;
        self.add_hashed_account(email, hashed, uid);
        Ok(())
    }

    /// Register an account with an existing PHC hash
    pub fn add_hashed_account(&self, email: &str, password: HashedPassword, uid: Uid) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize_email(email), Account { uid, password });
    }

    /// Observers currently attached to `session`
    pub fn subscriber_count(&self, session: &SessionToken) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .map_or(0, |entry| entry.publisher.subscriber_count())
    }

    /// Sessions currently held, expired ones included until the next prune
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop expired sessions, telling their observers they are signed out.
    /// Returns how many were dropped.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| {
            if entry.is_expired(now) {
                entry.publisher.publish(SessionEvent::SignedOut);
                false
            } else {
                true
            }
        });

        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Expired sessions dropped");
        }
        pruned
    }

    fn verify(&self, email: &str, password: &str) -> Option<Uid> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        let account = accounts.get(&normalize_email(email))?;
        let candidate = ClearTextPassword::for_verification(password);
        account
            .password
            .verify(&candidate, self.pepper.as_deref())
            .then(|| account.uid.clone())
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
        ttl: Duration,
    ) -> GateResult<SignedInSession> {
        let uid = self
            .verify(email, password)
            .ok_or(GateError::InvalidCredentials)?;

        self.prune_expired();

        let token = SessionToken::new();
        let entry = SessionEntry {
            publisher: SessionPublisher::new(SessionEvent::SignedIn(uid.clone())),
            expires_at: Instant::now() + ttl,
        };
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, entry);

        Ok(SignedInSession { token, uid })
    }

    async fn sign_out(&self, session: SessionToken) -> GateResult<Option<Uid>> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session);
        let Some(entry) = removed else {
            return Ok(None);
        };

        // Observers still see the final state after the publisher is gone
        let previous = entry.publisher.current().uid().cloned();
        entry.publisher.publish(SessionEvent::SignedOut);
        Ok(previous)
    }

    fn subscribe(&self, session: Option<SessionToken>) -> SessionSubscription {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        session
            .and_then(|token| sessions.get(&token))
            .filter(|entry| !entry.is_expired(now))
            .map_or_else(SessionSubscription::signed_out, |entry| {
                entry.publisher.subscribe()
            })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
