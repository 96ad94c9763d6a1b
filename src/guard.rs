//! Route guard middleware.
//!
//! DESIGN
//! ======
//! Every page request is classified by path, the session is resolved against
//! the provider, and a pure decision table picks pass or redirect. The
//! resolved identity rides along in request extensions so page handlers do
//! not ask the provider a second time.
//!
//! Provider outages are fail-closed by default: the request is handled as if
//! no session were present. `GUARD_FAIL_OPEN=true` lets such requests through
//! unguarded instead.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::device::DeviceId;
use crate::provider::Role;
use crate::services::session::{self, SessionLookup, SessionTokens};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

// =============================================================================
// CLASSIFICATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Static files, API and auth callback paths; never guarded.
    Bypass,
    /// The landing page `/`.
    Landing,
    /// Login and signup pages.
    Entry,
    Employer,
    JobSeeker,
    Unscoped,
}

impl RouteClass {
    /// Reachable without a session.
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Landing | Self::Entry)
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Scoped roots are matched before the file-name rule, so a dotted path
/// segment such as `/profile/skills/Node.js` is still guarded.
#[must_use]
pub fn classify(path: &str) -> RouteClass {
    const BYPASS_PREFIXES: [&str; 4] = ["/api/", "/auth/", "/assets/", "/favicon"];
    const SEEKER_ROOTS: [&str; 5] = ["/dashboard", "/jobs", "/matches", "/profile", "/chat"];

    if path == "/healthz" || BYPASS_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return RouteClass::Bypass;
    }
    if path == "/" {
        return RouteClass::Landing;
    }
    if path.starts_with("/login")
        || path.starts_with("/signup")
        || path == "/employer/login"
        || path == "/employer/signup"
    {
        return RouteClass::Entry;
    }
    if is_under(path, "/employer") {
        return RouteClass::Employer;
    }
    if SEEKER_ROOTS.iter().any(|root| is_under(path, root)) {
        return RouteClass::JobSeeker;
    }
    // Top-level static files (`/placeholder.svg`, `/robots.txt`).
    if path.contains('.') {
        return RouteClass::Bypass;
    }
    RouteClass::Unscoped
}

// =============================================================================
// DECISION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

/// First matching rule wins.
#[must_use]
pub fn decide(class: RouteClass, role: Option<Role>) -> GuardDecision {
    if class == RouteClass::Bypass {
        return GuardDecision::Pass;
    }
    let Some(role) = role else {
        return if class.is_public() { GuardDecision::Pass } else { GuardDecision::Redirect(LOGIN_PATH) };
    };
    match (role, class) {
        (Role::Employer, RouteClass::JobSeeker | RouteClass::Unscoped) => {
            GuardDecision::Redirect(Role::Employer.dashboard_path())
        }
        (Role::JobSeeker, RouteClass::Employer) => GuardDecision::Redirect(Role::JobSeeker.dashboard_path()),
        (_, RouteClass::Entry) => GuardDecision::Redirect(role.dashboard_path()),
        _ => GuardDecision::Pass,
    }
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// Guard applied to every request via `middleware::from_fn_with_state`.
pub async fn route_guard(State(state): State<AppState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    let class = classify(req.uri().path());
    if class == RouteClass::Bypass {
        return next.run(req).await;
    }

    let secure = state.settings.cookie_secure;
    let tokens = SessionTokens::from_jar(&jar);
    let lookup = session::lookup(state.provider.as_ref(), &tokens).await;

    let (user, jar) = match lookup {
        SessionLookup::Active(user) => (Some(user), None),
        SessionLookup::Refreshed(provider_session) => {
            let device = req.extensions().get::<DeviceId>().copied();
            let jar = state.adopt_refreshed(device, jar, &provider_session);
            (Some(provider_session.user), Some(jar))
        }
        SessionLookup::Anonymous if tokens.is_empty() => (None, None),
        SessionLookup::Anonymous => (None, Some(session::clear_session_cookies(jar, secure))),
        SessionLookup::Unavailable(e) => {
            let path = req.uri().path();
            if state.settings.guard.fail_open {
                tracing::warn!(error = %e, %path, "auth provider unavailable; passing request unguarded");
                return next.run(req).await;
            }
            tracing::warn!(error = %e, %path, "auth provider unavailable; treating request as signed out");
            (None, None)
        }
    };

    let response = match decide(class, user.as_ref().map(|u| u.role)) {
        GuardDecision::Redirect(to) => {
            tracing::debug!(path = %req.uri().path(), to, "guard redirect");
            Redirect::temporary(to).into_response()
        }
        GuardDecision::Pass => {
            if let Some(user) = user {
                req.extensions_mut().insert(user);
            }
            next.run(req).await
        }
    };

    match jar {
        Some(jar) => (jar, response).into_response(),
        None => response,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
