use super::*;
use crate::provider::Role;
use crate::state::test_helpers::{MockProvider, identity};

fn tokens(access: Option<&str>, refresh: Option<&str>) -> SessionTokens {
    SessionTokens { access: access.map(str::to_owned), refresh: refresh.map(str::to_owned) }
}

// =============================================================================
// Cookies
// =============================================================================

#[test]
fn tokens_from_jar_skip_empty_values() {
    let jar = CookieJar::new()
        .add(Cookie::new(ACCESS_COOKIE, "abc"))
        .add(Cookie::new(REFRESH_COOKIE, ""));
    let tokens = SessionTokens::from_jar(&jar);
    assert_eq!(tokens.access.as_deref(), Some("abc"));
    assert_eq!(tokens.refresh, None);
    assert!(!tokens.is_empty());
    assert!(SessionTokens::from_jar(&CookieJar::new()).is_empty());
}

#[test]
fn set_session_cookies_writes_both_tokens() {
    let session = ProviderSession {
        access_token: "at".into(),
        refresh_token: "rt".into(),
        expires_at: None,
        expires_in: Some(3600),
        user: identity("a@example.com", Role::JobSeeker),
    };
    let jar = set_session_cookies(CookieJar::new(), &session, true);

    let access = jar.get(ACCESS_COOKIE).unwrap();
    assert_eq!(access.value(), "at");
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(access.secure(), Some(true));
    assert_eq!(access.max_age(), Some(Duration::seconds(3600)));
    assert_eq!(jar.get(REFRESH_COOKIE).unwrap().value(), "rt");
}

#[test]
fn clear_session_cookies_expires_both() {
    let jar = clear_session_cookies(CookieJar::new(), false);
    for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
        let cookie = jar.get(name).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}

// =============================================================================
// lookup
// =============================================================================

#[tokio::test]
async fn live_access_token_is_active() {
    let provider = MockProvider::new();
    let user = identity("a@example.com", Role::JobSeeker);
    provider.with_user("tok", user.clone());

    let result = lookup(&provider, &tokens(Some("tok"), None)).await;
    assert!(matches!(&result, SessionLookup::Active(u) if *u == user));
    assert_eq!(result.identity(), Some(&user));
}

#[tokio::test]
async fn stale_access_token_falls_back_to_refresh() {
    let provider = MockProvider::new();
    let user = identity("a@example.com", Role::Employer);
    provider.with_refresh_token("rt-old", user.clone());

    let result = lookup(&provider, &tokens(Some("expired"), Some("rt-old"))).await;
    let SessionLookup::Refreshed(session) = result else {
        panic!("expected refreshed session");
    };
    assert_eq!(session.user, user);
    assert_eq!(session.access_token, "at-a@example.com");
}

#[tokio::test]
async fn refresh_only_request_is_refreshed() {
    let provider = MockProvider::new();
    provider.with_refresh_token("rt", identity("a@example.com", Role::JobSeeker));
    assert!(matches!(lookup(&provider, &tokens(None, Some("rt"))).await, SessionLookup::Refreshed(_)));
}

#[tokio::test]
async fn rejected_refresh_is_anonymous() {
    let provider = MockProvider::new();
    let result = lookup(&provider, &tokens(Some("expired"), Some("bogus"))).await;
    assert!(matches!(result, SessionLookup::Anonymous));
}

#[tokio::test]
async fn no_tokens_is_anonymous_without_provider_call() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    assert!(matches!(lookup(&provider, &SessionTokens::default()).await, SessionLookup::Anonymous));
}

#[tokio::test]
async fn provider_down_is_unavailable() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    let result = lookup(&provider, &tokens(Some("tok"), Some("rt"))).await;
    assert!(matches!(result, SessionLookup::Unavailable(ProviderError::Request(_))));
    assert!(result.identity().is_none());
}

// =============================================================================
// Code verifier cookie
// =============================================================================

#[test]
fn verifier_cookie_round_trips_and_clears() {
    let jar = set_verifier_cookie(CookieJar::new(), "abc123", true);
    assert_eq!(verifier_from_jar(&jar).as_deref(), Some("abc123"));
    let cookie = jar.get(VERIFIER_COOKIE).unwrap();
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));

    let jar = clear_verifier_cookie(jar, true);
    assert_eq!(verifier_from_jar(&jar), None);
}

// =============================================================================
// revoke
// =============================================================================

#[tokio::test]
async fn revoke_live_access_token_signs_it_out() {
    let provider = MockProvider::new();
    provider.with_user("at", identity("a@example.com", Role::JobSeeker));
    revoke(&provider, &tokens(Some("at"), None)).await.unwrap();
    assert_eq!(provider.signed_out(), vec!["at".to_owned()]);
}

#[tokio::test]
async fn revoke_refresh_only_request_kills_refresh_token() {
    let provider = MockProvider::new();
    provider.with_refresh_token("rt", identity("ann@example.com", Role::JobSeeker));

    revoke(&provider, &tokens(None, Some("rt"))).await.unwrap();

    assert_eq!(provider.signed_out(), vec!["at-ann@example.com".to_owned()]);
    assert!(provider.refresh_session("rt").await.is_err());
    assert!(provider.refresh_session("rt-ann@example.com").await.is_err());
}

#[tokio::test]
async fn revoke_stale_access_token_goes_through_refresh() {
    let provider = MockProvider::new();
    provider.with_refresh_token("rt", identity("ann@example.com", Role::JobSeeker));
    revoke(&provider, &tokens(Some("expired"), Some("rt"))).await.unwrap();
    assert_eq!(provider.signed_out(), vec!["at-ann@example.com".to_owned()]);
}

#[tokio::test]
async fn revoke_without_session_is_noop() {
    let provider = MockProvider::new();
    revoke(&provider, &tokens(None, None)).await.unwrap();
    revoke(&provider, &tokens(None, Some("unknown"))).await.unwrap();
    assert!(provider.signed_out().is_empty());
}

#[tokio::test]
async fn revoke_reports_provider_outage() {
    let provider = MockProvider::new();
    provider.set_failing(true);
    assert!(matches!(
        revoke(&provider, &tokens(Some("at"), None)).await,
        Err(ProviderError::Request(_))
    ));
}
