//! Session Observation
//!
//! One browser session's authentication state, published by the identity
//! provider and observed by every guard mounted for that session.
//!
//! Built on `tokio::sync::watch`: a new subscriber sees the current state
//! first, then each change. Rapid successive changes may coalesce, so a
//! subscriber is only guaranteed to see the latest state, never an older
//! one after a newer one.

use tokio::sync::watch;

use crate::domain::value_object::uid::Uid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedOut,
    SignedIn(Uid),
}

impl SessionEvent {
    pub fn uid(&self) -> Option<&Uid> {
        match self {
            SessionEvent::SignedIn(uid) => Some(uid),
            SessionEvent::SignedOut => None,
        }
    }
}

/// Owning side of a session's state; held by the identity provider
#[derive(Debug)]
pub struct SessionPublisher {
    tx: watch::Sender<SessionEvent>,
}

impl SessionPublisher {
    pub fn new(initial: SessionEvent) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Publish a new state. Succeeds even with no subscribers.
    pub fn publish(&self, event: SessionEvent) {
        self.tx.send_replace(event);
    }

    pub fn current(&self) -> SessionEvent {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription::new(self.tx.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Observing side. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<SessionEvent>,
    delivered_current: bool,
}

impl SessionSubscription {
    fn new(rx: watch::Receiver<SessionEvent>) -> Self {
        Self {
            rx,
            delivered_current: false,
        }
    }

    /// A subscription that reports "signed out" once and then closes.
    /// Used for requests that carry no session at all.
    pub fn signed_out() -> Self {
        let (_tx, rx) = watch::channel(SessionEvent::SignedOut);
        Self::new(rx)
    }

    /// Next session state: the current one on first call, then each change.
    /// `None` once the publisher is gone and everything has been delivered.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        if !self.delivered_current {
            self.delivered_current = true;
            return Some(self.rx.borrow_and_update().clone());
        }

        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
