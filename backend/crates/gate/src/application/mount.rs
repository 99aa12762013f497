//! Guard Mount
//!
//! Runs a [`PortalGuard`] for as long as a guarded subtree is mounted: it
//! consumes the session subscription, performs the role lookups the guard
//! asks for (each bounded by a timeout), and publishes every state change.
//!
//! Lookups superseded by a newer session event are aborted. Any result that
//! still slips through is dropped by the guard's generation check.
//! Dropping the [`MountedGuard`] stops the task and releases the
//! subscription.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::application::guard::{LookupOutcome, LookupTicket, PortalGuard};
use crate::domain::entity::{guard_state::GuardState, session::SessionSubscription};
use crate::domain::repository::RoleDirectory;
use crate::domain::value_object::portal_id::PortalId;

/// Handle to a running guard
#[derive(Debug)]
pub struct MountedGuard {
    portal: PortalId,
    state: watch::Receiver<GuardState>,
    task: JoinHandle<()>,
}

impl MountedGuard {
    pub fn portal(&self) -> PortalId {
        self.portal
    }

    /// Current state, possibly still pending
    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    /// Wait until the guard can render or redirect.
    ///
    /// `None` only when the guard stopped without ever settling.
    pub async fn settled(&mut self) -> Option<GuardState> {
        let state = self.state.wait_for(GuardState::is_settled).await.ok()?;
        Some(state.clone())
    }

    /// Wait for the next state change
    pub async fn changed(&mut self) -> Option<GuardState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }
}

impl Drop for MountedGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Mount a guard for `portal` over one session subscription
pub fn mount<D>(
    portal: PortalId,
    subscription: SessionSubscription,
    directory: Arc<D>,
    lookup_timeout: Duration,
) -> MountedGuard
where
    D: RoleDirectory + Send + Sync + 'static,
{
    let (tx, rx) = watch::channel(GuardState::Unknown);
    let guard = PortalGuard::new(portal);
    let task = tokio::spawn(drive(guard, subscription, directory, lookup_timeout, tx));

    MountedGuard {
        portal,
        state: rx,
        task,
    }
}

async fn drive<D>(
    mut guard: PortalGuard,
    mut subscription: SessionSubscription,
    directory: Arc<D>,
    lookup_timeout: Duration,
    tx: watch::Sender<GuardState>,
) where
    D: RoleDirectory + Send + Sync + 'static,
{
    let mut lookups: JoinSet<(LookupTicket, LookupOutcome)> = JoinSet::new();
    let mut session_open = true;

    loop {
        tokio::select! {
            event = subscription.next(), if session_open => {
                let Some(event) = event else {
                    // Publisher gone; finish whatever lookup is still owed
                    session_open = false;
                    continue;
                };

                let generation = guard.generation();
                let ticket = guard.on_session(event);
                if guard.generation() != generation {
                    lookups.abort_all();
                }
                if let Some(ticket) = ticket {
                    lookups.spawn(lookup(directory.clone(), ticket, lookup_timeout));
                }
                tx.send_replace(guard.state().clone());
            }
            Some(joined) = lookups.join_next(), if !lookups.is_empty() => {
                match joined {
                    Ok((ticket, outcome)) => {
                        if guard.on_lookup(&ticket, outcome) {
                            tx.send_replace(guard.state().clone());
                        }
                    }
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => {
                        // Only the current lookup is ever left running
                        if let Some(ticket) = guard.pending() {
                            guard.on_lookup(&ticket, LookupOutcome::Failed(e.to_string()));
                            tx.send_replace(guard.state().clone());
                        }
                    }
                }
            }
            else => break,
        }
    }

    tracing::debug!(portal = %guard.portal(), state = guard.state().name(), "Guard stopped");
}

async fn lookup<D>(
    directory: Arc<D>,
    ticket: LookupTicket,
    lookup_timeout: Duration,
) -> (LookupTicket, LookupOutcome)
where
    D: RoleDirectory + Send + Sync + 'static,
{
    let outcome = match tokio::time::timeout(lookup_timeout, directory.lookup(&ticket.uid)).await {
        Ok(Ok(Some(record))) => LookupOutcome::Found(record),
        Ok(Ok(None)) => LookupOutcome::NotFound,
        Ok(Err(e)) => LookupOutcome::Failed(e.to_string()),
        Err(_) => LookupOutcome::TimedOut,
    };
    (ticket, outcome)
}
