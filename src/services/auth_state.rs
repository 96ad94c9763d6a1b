//! Reconciled auth state for one device.
//!
//! DESIGN
//! ======
//! `Unresolved -> Resolved { user, source }`. The first resolution takes the
//! provider's answer whenever the provider gives one; the fallback store is
//! consulted only if that first provider call fails. Once resolved, the state
//! only moves through auth events (sign-in, sign-out, refresh) and never
//! re-enters loading.
//!
//! The machine itself is pure: it returns a [`StoreEffect`] describing the
//! fallback-store write it needs, and [`AuthWatcher`] performs the I/O.

use std::sync::Arc;

use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::device::DeviceId;
use crate::provider::{AuthProvider, Identity, ProviderSession};
use crate::services::fallback::{self, FallbackStore};
use crate::services::session::{self, SessionLookup, SessionTokens};

const DEFAULT_EVENT_CAPACITY: usize = 256;

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Provider,
    Cache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unresolved,
    Resolved { user: Option<Identity>, source: Source },
}

/// Result of asking the provider who the user is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Session(Identity),
    NoSession,
    Failed,
}

/// Fallback-store write requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEffect {
    None,
    Write(Identity),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    pub loading: bool,
    pub user: Option<Identity>,
    pub source: Option<Source>,
}

#[derive(Debug, Clone)]
pub struct AuthStateMachine {
    state: AuthState,
}

impl Default for AuthStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self { state: AuthState::Unresolved }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        matches!(self.state, AuthState::Unresolved)
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        match &self.state {
            AuthState::Unresolved => AuthSnapshot { loading: true, user: None, source: None },
            AuthState::Resolved { user, source } => {
                AuthSnapshot { loading: false, user: user.clone(), source: Some(*source) }
            }
        }
    }

    /// Settle the first resolution. Later calls are ignored: after the first
    /// answer only events move the state.
    pub fn resolve(&mut self, outcome: ProviderOutcome, cached: Option<Identity>) -> StoreEffect {
        if !self.loading() {
            return StoreEffect::None;
        }
        match outcome {
            ProviderOutcome::Session(identity) => {
                self.state = AuthState::Resolved { user: Some(identity.clone()), source: Source::Provider };
                StoreEffect::Write(identity)
            }
            ProviderOutcome::NoSession => {
                self.state = AuthState::Resolved { user: None, source: Source::Provider };
                if cached.is_some() { StoreEffect::Clear } else { StoreEffect::None }
            }
            ProviderOutcome::Failed => {
                self.state = AuthState::Resolved { user: cached, source: Source::Cache };
                StoreEffect::None
            }
        }
    }

    /// Apply a provider change notification.
    pub fn apply(&mut self, event: &AuthEventKind) -> StoreEffect {
        match event {
            AuthEventKind::SignedIn(identity)
            | AuthEventKind::UserUpdated(identity)
            | AuthEventKind::TokenRefreshed(identity) => {
                self.state = AuthState::Resolved { user: Some(identity.clone()), source: Source::Provider };
                StoreEffect::Write(identity.clone())
            }
            AuthEventKind::SignedOut => {
                self.state = AuthState::Resolved { user: None, source: Source::Provider };
                StoreEffect::Clear
            }
        }
    }
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn(Identity),
    SignedOut,
    UserUpdated(Identity),
    TokenRefreshed(Identity),
}

impl AuthEventKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::UserUpdated(_) => "USER_UPDATED",
            Self::TokenRefreshed(_) => "TOKEN_REFRESHED",
        }
    }
}

/// An auth change on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub device: DeviceId,
    pub kind: AuthEventKind,
}

/// Fan-out hub for auth change notifications.
#[derive(Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl AuthEvents {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, device: DeviceId, kind: AuthEventKind) {
        tracing::debug!(%device, event = kind.name(), "auth event");
        let _ = self.tx.send(AuthEvent { device, kind });
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }
}

// =============================================================================
// WATCHER
// =============================================================================

/// Drives an [`AuthStateMachine`] for one device against the live provider
/// and the fallback store.
///
/// Resolution goes through [`session::lookup`], the same path the route guard
/// takes, so a stale access token with a live refresh token resolves to the
/// user. The refreshed session is held until the caller takes it with
/// [`AuthWatcher::take_refreshed`] and writes the new cookies.
pub struct AuthWatcher {
    provider: Arc<dyn AuthProvider>,
    store: Arc<dyn FallbackStore>,
    device: DeviceId,
    tokens: SessionTokens,
    refreshed: Option<ProviderSession>,
    machine: AuthStateMachine,
}

impl AuthWatcher {
    #[must_use]
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        store: Arc<dyn FallbackStore>,
        device: DeviceId,
        tokens: SessionTokens,
    ) -> Self {
        Self { provider, store, device, tokens, refreshed: None, machine: AuthStateMachine::new() }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.machine.snapshot()
    }

    /// Session minted by a refresh during resolution, if any.
    pub fn take_refreshed(&mut self) -> Option<ProviderSession> {
        self.refreshed.take()
    }

    /// Perform the first resolution (no-op once resolved).
    pub async fn resolve(&mut self) -> AuthSnapshot {
        if !self.machine.loading() {
            return self.machine.snapshot();
        }

        let outcome = match session::lookup(self.provider.as_ref(), &self.tokens).await {
            SessionLookup::Active(identity) => ProviderOutcome::Session(identity),
            SessionLookup::Refreshed(refreshed) => {
                let identity = refreshed.user.clone();
                self.refreshed = Some(refreshed);
                ProviderOutcome::Session(identity)
            }
            SessionLookup::Anonymous => ProviderOutcome::NoSession,
            SessionLookup::Unavailable(e) => {
                tracing::warn!(device = %self.device, error = %e, "provider lookup failed; using fallback identity");
                ProviderOutcome::Failed
            }
        };
        let cached = fallback::recall(self.store.as_ref(), self.device).await;

        let effect = self.machine.resolve(outcome, cached);
        self.apply_effect(effect).await;
        self.machine.snapshot()
    }

    /// Apply one auth event addressed to this device.
    pub async fn handle(&mut self, event: &AuthEventKind) -> AuthSnapshot {
        let effect = self.machine.apply(event);
        self.apply_effect(effect).await;
        self.machine.snapshot()
    }

    async fn apply_effect(&self, effect: StoreEffect) {
        match effect {
            StoreEffect::None => {}
            StoreEffect::Write(identity) => fallback::remember(self.store.as_ref(), self.device, &identity).await,
            StoreEffect::Clear => fallback::forget(self.store.as_ref(), self.device).await,
        }
    }

    /// Resolve, then follow this device's auth events. The subscription lives
    /// as long as the returned stream; dropping it unsubscribes.
    pub fn into_stream(self, rx: broadcast::Receiver<AuthEvent>) -> impl Stream<Item = AuthSnapshot> + Send {
        futures::stream::unfold((self, rx, false), |(mut watcher, mut rx, started)| async move {
            if !started {
                let snapshot = watcher.resolve().await;
                return Some((snapshot, (watcher, rx, true)));
            }
            loop {
                match rx.recv().await {
                    Ok(event) if event.device == watcher.device => {
                        let snapshot = watcher.handle(&event.kind).await;
                        return Some((snapshot, (watcher, rx, true)));
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(device = %watcher.device, skipped, "auth event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "auth_state_test.rs"]
mod tests;
