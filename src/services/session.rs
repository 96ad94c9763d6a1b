//! Session cookies and provider-backed session lookup.
//!
//! ARCHITECTURE
//! ============
//! The browser holds the provider's access and refresh tokens in two HttpOnly
//! cookies. Every lookup asks the provider about the access token; when the
//! provider no longer accepts it, the refresh token is traded for a new pair,
//! which the caller must write back to the browser.
//!
//! TRADE-OFFS
//! ==========
//! Refresh tokens are single use at the provider, so two concurrent requests
//! with the same stale access token can race: one refreshes, the other sees a
//! rejected refresh and is treated as signed out for that one request.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::provider::{AuthProvider, Identity, ProviderError, ProviderSession};

pub const ACCESS_COOKIE: &str = "jobswipe_access_token";
pub const REFRESH_COOKIE: &str = "jobswipe_refresh_token";
/// PKCE verifier kept between sign-up and the confirmation callback.
pub const VERIFIER_COOKIE: &str = "jobswipe_code_verifier";
const REFRESH_COOKIE_MAX_AGE_DAYS: i64 = 30;
const VERIFIER_COOKIE_MAX_AGE_DAYS: i64 = 1;

// =============================================================================
// COOKIES
// =============================================================================

/// Tokens carried by the request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl SessionTokens {
    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Self {
        let read = |name: &str| jar.get(name).map(Cookie::value).filter(|v| !v.is_empty()).map(str::to_owned);
        Self { access: read(ACCESS_COOKIE), refresh: read(REFRESH_COOKIE) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Store a provider session in the browser.
#[must_use]
pub fn set_session_cookies(jar: CookieJar, session: &ProviderSession, secure: bool) -> CookieJar {
    let mut access = base_cookie(ACCESS_COOKIE, session.access_token.clone(), secure);
    if let Some(secs) = session.expires_in.filter(|s| *s > 0) {
        access.set_max_age(Duration::seconds(secs));
    }
    let mut refresh = base_cookie(REFRESH_COOKIE, session.refresh_token.clone(), secure);
    refresh.set_max_age(Duration::days(REFRESH_COOKIE_MAX_AGE_DAYS));
    jar.add(access).add(refresh)
}

/// Expire both session cookies.
#[must_use]
pub fn clear_session_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    let expired = |name| {
        let mut cookie = base_cookie(name, String::new(), secure);
        cookie.set_max_age(Duration::ZERO);
        cookie
    };
    jar.add(expired(ACCESS_COOKIE)).add(expired(REFRESH_COOKIE))
}

#[must_use]
pub fn verifier_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(VERIFIER_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[must_use]
pub fn set_verifier_cookie(jar: CookieJar, verifier: &str, secure: bool) -> CookieJar {
    let mut cookie = base_cookie(VERIFIER_COOKIE, verifier.to_owned(), secure);
    cookie.set_max_age(Duration::days(VERIFIER_COOKIE_MAX_AGE_DAYS));
    jar.add(cookie)
}

#[must_use]
pub fn clear_verifier_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    let mut cookie = base_cookie(VERIFIER_COOKIE, String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    jar.add(cookie)
}

// =============================================================================
// LOOKUP
// =============================================================================

/// Result of asking the provider who owns the request's tokens.
#[derive(Debug)]
pub enum SessionLookup {
    /// The access token is live.
    Active(Identity),
    /// The access token was stale; a refresh produced a new session.
    Refreshed(ProviderSession),
    /// No usable tokens.
    Anonymous,
    /// The provider could not be asked.
    Unavailable(ProviderError),
}

impl SessionLookup {
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Active(user) => Some(user),
            Self::Refreshed(session) => Some(&session.user),
            Self::Anonymous | Self::Unavailable(_) => None,
        }
    }
}

pub async fn lookup(provider: &dyn AuthProvider, tokens: &SessionTokens) -> SessionLookup {
    if let Some(access) = tokens.access.as_deref() {
        match provider.get_user(access).await {
            Ok(Some(user)) => return SessionLookup::Active(user),
            Ok(None) => {}
            Err(e) => return SessionLookup::Unavailable(e),
        }
    }

    let Some(refresh) = tokens.refresh.as_deref() else {
        return SessionLookup::Anonymous;
    };
    match provider.refresh_session(refresh).await {
        Ok(session) => SessionLookup::Refreshed(session),
        Err(ProviderError::Rejected { status, message }) => {
            tracing::debug!(status, %message, "refresh token rejected");
            SessionLookup::Anonymous
        }
        Err(e) => SessionLookup::Unavailable(e),
    }
}

/// End the provider session behind the request's tokens.
///
/// A refresh-only request is refreshed first so the provider can revoke the
/// session, including its refresh token, through the new access token.
///
/// # Errors
///
/// Returns the provider error when the provider cannot be reached.
pub async fn revoke(provider: &dyn AuthProvider, tokens: &SessionTokens) -> Result<(), ProviderError> {
    let access = match lookup(provider, tokens).await {
        SessionLookup::Active(_) => tokens.access.clone().unwrap_or_default(),
        SessionLookup::Refreshed(session) => session.access_token,
        SessionLookup::Anonymous => return Ok(()),
        SessionLookup::Unavailable(e) => return Err(e),
    };
    provider.sign_out(&access).await
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
