use super::*;
use crate::provider::Role;
use crate::services::fallback::MemoryFallbackStore;
use crate::state::test_helpers::{MockProvider, identity};
use futures::StreamExt;
use tokio::time::{Duration, timeout};

// =============================================================================
// AuthStateMachine: pure transitions
// =============================================================================

#[test]
fn starts_loading_without_user() {
    let machine = AuthStateMachine::new();
    assert!(machine.loading());
    assert_eq!(machine.snapshot(), AuthSnapshot { loading: true, user: None, source: None });
}

#[test]
fn provider_session_wins_and_writes_through() {
    let mut machine = AuthStateMachine::new();
    let live = identity("live@example.com", Role::JobSeeker);
    let stale = identity("stale@example.com", Role::JobSeeker);

    let effect = machine.resolve(ProviderOutcome::Session(live.clone()), Some(stale));
    assert_eq!(effect, StoreEffect::Write(live.clone()));

    let snap = machine.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.user, Some(live));
    assert_eq!(snap.source, Some(Source::Provider));
}

#[test]
fn no_session_clears_stale_cache() {
    let mut machine = AuthStateMachine::new();
    let stale = identity("stale@example.com", Role::Employer);

    let effect = machine.resolve(ProviderOutcome::NoSession, Some(stale));
    assert_eq!(effect, StoreEffect::Clear);
    assert_eq!(machine.snapshot().user, None);
    assert_eq!(machine.snapshot().source, Some(Source::Provider));
}

#[test]
fn no_session_without_cache_has_no_effect() {
    let mut machine = AuthStateMachine::new();
    assert_eq!(machine.resolve(ProviderOutcome::NoSession, None), StoreEffect::None);
    assert!(!machine.loading());
}

#[test]
fn provider_failure_falls_back_to_cache() {
    let mut machine = AuthStateMachine::new();
    let cached = identity("cached@example.com", Role::JobSeeker);

    let effect = machine.resolve(ProviderOutcome::Failed, Some(cached.clone()));
    assert_eq!(effect, StoreEffect::None);
    let snap = machine.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.user, Some(cached));
    assert_eq!(snap.source, Some(Source::Cache));
}

#[test]
fn provider_failure_with_empty_cache_resolves_to_none() {
    let mut machine = AuthStateMachine::new();
    machine.resolve(ProviderOutcome::Failed, None);
    let snap = machine.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.user, None);
}

#[test]
fn second_resolution_is_ignored() {
    let mut machine = AuthStateMachine::new();
    let first = identity("first@example.com", Role::JobSeeker);
    machine.resolve(ProviderOutcome::Session(first.clone()), None);

    let effect = machine.resolve(ProviderOutcome::Failed, Some(identity("cached@example.com", Role::JobSeeker)));
    assert_eq!(effect, StoreEffect::None);
    assert_eq!(machine.snapshot().user, Some(first));
}

#[test]
fn sign_out_event_clears_user_and_store() {
    let mut machine = AuthStateMachine::new();
    machine.resolve(ProviderOutcome::Session(identity("a@example.com", Role::JobSeeker)), None);

    let effect = machine.apply(&AuthEventKind::SignedOut);
    assert_eq!(effect, StoreEffect::Clear);
    let snap = machine.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.user, None);
}

#[test]
fn sign_in_event_before_resolution_resolves() {
    let mut machine = AuthStateMachine::new();
    let user = identity("a@example.com", Role::Employer);

    let effect = machine.apply(&AuthEventKind::SignedIn(user.clone()));
    assert_eq!(effect, StoreEffect::Write(user.clone()));
    assert!(!machine.loading());
    assert_eq!(machine.snapshot().user, Some(user));
}

#[test]
fn refresh_and_update_events_replace_user() {
    let mut machine = AuthStateMachine::new();
    machine.resolve(ProviderOutcome::NoSession, None);

    let updated = identity("renamed@example.com", Role::JobSeeker);
    machine.apply(&AuthEventKind::UserUpdated(updated.clone()));
    assert_eq!(machine.snapshot().user, Some(updated));

    let refreshed = identity("refreshed@example.com", Role::JobSeeker);
    machine.apply(&AuthEventKind::TokenRefreshed(refreshed.clone()));
    assert_eq!(machine.snapshot().user, Some(refreshed));
}

#[test]
fn event_names() {
    assert_eq!(AuthEventKind::SignedOut.name(), "SIGNED_OUT");
    assert_eq!(AuthEventKind::SignedIn(identity("a@example.com", Role::JobSeeker)).name(), "SIGNED_IN");
}

// =============================================================================
// AuthWatcher: provider + store I/O
// =============================================================================

fn access_only(token: &str) -> SessionTokens {
    SessionTokens { access: Some(token.to_owned()), refresh: None }
}

fn watcher_parts() -> (Arc<MockProvider>, Arc<MemoryFallbackStore>, DeviceId) {
    (Arc::new(MockProvider::new()), Arc::new(MemoryFallbackStore::new()), DeviceId::generate())
}

#[tokio::test]
async fn watcher_writes_provider_identity_to_store() {
    let (provider, store, device) = watcher_parts();
    let user = identity("live@example.com", Role::JobSeeker);
    provider.with_user("tok", user.clone());

    let mut watcher = AuthWatcher::new(provider, store.clone(), device, access_only("tok"));
    assert!(watcher.snapshot().loading);
    let snap = watcher.resolve().await;

    assert_eq!(snap.user, Some(user.clone()));
    assert_eq!(store.get(device).await.unwrap(), Some(user));
}

#[tokio::test]
async fn watcher_uses_cache_when_provider_down() {
    let (provider, store, device) = watcher_parts();
    let cached = identity("cached@example.com", Role::Employer);
    store.set(device, &cached).await.unwrap();
    provider.set_failing(true);

    let mut watcher = AuthWatcher::new(provider, store, device, access_only("tok"));
    let snap = watcher.resolve().await;

    assert!(!snap.loading);
    assert_eq!(snap.user, Some(cached));
    assert_eq!(snap.source, Some(Source::Cache));
}

#[tokio::test]
async fn watcher_without_token_reports_no_user_and_clears_cache() {
    let (provider, store, device) = watcher_parts();
    store
        .set(device, &identity("gone@example.com", Role::JobSeeker))
        .await
        .unwrap();

    let mut watcher = AuthWatcher::new(provider, store.clone(), device, SessionTokens::default());
    let snap = watcher.resolve().await;

    assert_eq!(snap.user, None);
    assert!(store.get(device).await.unwrap().is_none());
}

#[tokio::test]
async fn watcher_rejected_token_reports_no_user() {
    let (provider, store, device) = watcher_parts();
    let mut watcher = AuthWatcher::new(provider, store, device, access_only("expired"));
    let snap = watcher.resolve().await;
    assert!(!snap.loading);
    assert_eq!(snap.user, None);
    assert_eq!(snap.source, Some(Source::Provider));
}

#[tokio::test]
async fn watcher_refreshes_when_only_refresh_token_remains() {
    let (provider, store, device) = watcher_parts();
    let user = identity("ann@example.com", Role::JobSeeker);
    provider.with_refresh_token("rt", user.clone());
    store.set(device, &user).await.unwrap();

    let tokens = SessionTokens { access: None, refresh: Some("rt".into()) };
    let mut watcher = AuthWatcher::new(provider, store.clone(), device, tokens);
    let snap = watcher.resolve().await;

    assert_eq!(snap.user, Some(user.clone()));
    assert_eq!(snap.source, Some(Source::Provider));
    assert_eq!(store.get(device).await.unwrap(), Some(user));

    let refreshed = watcher.take_refreshed().expect("refresh should yield a new session");
    assert_eq!(refreshed.access_token, "at-ann@example.com");
    assert!(watcher.take_refreshed().is_none());
}

#[tokio::test]
async fn stream_yields_resolution_then_device_events() {
    let (provider, store, device) = watcher_parts();
    let user = identity("live@example.com", Role::JobSeeker);
    provider.with_user("tok", user.clone());
    let events = AuthEvents::default();

    let watcher = AuthWatcher::new(provider, store.clone(), device, access_only("tok"));
    let stream = watcher.into_stream(events.subscribe());
    futures::pin_mut!(stream);

    let first = stream.next().await.unwrap();
    assert!(!first.loading);
    assert_eq!(first.user, Some(user));

    // Another device's sign-out must not reach this subscriber.
    events.publish(DeviceId::generate(), AuthEventKind::SignedOut);
    events.publish(device, AuthEventKind::SignedOut);

    let next = timeout(Duration::from_millis(500), stream.next())
        .await
        .expect("event should arrive")
        .unwrap();
    assert_eq!(next.user, None);
    assert!(store.get(device).await.unwrap().is_none());
}

#[tokio::test]
async fn stream_ends_when_hub_dropped() {
    let (provider, store, device) = watcher_parts();
    let events = AuthEvents::default();
    let rx = events.subscribe();
    drop(events);

    let stream = AuthWatcher::new(provider, store, device, SessionTokens::default()).into_stream(rx);
    futures::pin_mut!(stream);
    assert!(stream.next().await.is_some());
    assert!(stream.next().await.is_none());
}
