//! Auth routes: password sign-up/sign-in, email verification callback,
//! sign-out, and the reconciled auth state (snapshot and live stream).

use axum::extract::{FromRef, FromRequestParts, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use futures::{Stream, StreamExt};
use serde::Deserialize;

use super::{ApiError, api_error};
use crate::device::DeviceId;
use crate::provider::pkce::PkcePair;
use crate::provider::{Identity, ProviderError, ProviderSession, Role, SignUpRequest};
use crate::services::auth_state::{AuthEventKind, AuthSnapshot, AuthWatcher};
use crate::services::fallback;
use crate::services::session::{self, SessionTokens};
use crate::state::AppState;

const CALLBACK_FAILED_PATH: &str = "/login?error=callback_failed";
const EMPLOYER_ONLY_MESSAGE: &str = "This login is for employers only. Please use the regular login for job seekers.";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user for a handler.
///
/// Guarded pages find the identity the route guard already resolved in
/// request extensions. API routes bypass the guard, so the access-token
/// cookie is checked against the provider here instead.
pub struct AuthUser {
    pub user: Identity,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<Identity>() {
            return Ok(Self { user: user.clone() });
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = SessionTokens::from_jar(&jar).access else {
            return Err(StatusCode::UNAUTHORIZED);
        };

        let app_state = AppState::from_ref(state);
        let user = app_state
            .provider
            .get_user(&token)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "provider user lookup failed");
                StatusCode::SERVICE_UNAVAILABLE
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Status and form message for a failed provider call.
pub(crate) fn provider_error_response(err: &ProviderError) -> ApiError {
    let status = match err {
        ProviderError::Rejected { status, .. } => StatusCode::from_u16(*status)
            .ok()
            .filter(StatusCode::is_client_error)
            .unwrap_or(StatusCode::BAD_GATEWAY),
        _ => StatusCode::BAD_GATEWAY,
    };
    api_error(status, &err.user_message())
}

/// Store the session in cookies, mirror the identity into the fallback store
/// and announce the sign-in to this device's subscribers.
async fn establish_session(state: &AppState, device: DeviceId, jar: CookieJar, session: &ProviderSession) -> CookieJar {
    fallback::remember(state.fallback.as_ref(), device, &session.user).await;
    state.events.publish(device, AuthEventKind::SignedIn(session.user.clone()));
    session::set_session_cookies(jar, session, state.settings.cookie_secure)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// =============================================================================
// SIGN UP
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub is_employer: bool,
}

/// Form checks done before the provider is asked.
pub(crate) fn validate_signup(body: &SignupBody) -> Result<(), &'static str> {
    if [&body.name, &body.email, &body.password, &body.confirm_password]
        .iter()
        .any(|field| is_blank(field))
    {
        return Err("Please fill out all required fields");
    }
    if body.password != body.confirm_password {
        return Err("Passwords don't match");
    }
    Ok(())
}

/// `POST /api/auth/signup`: create an account; confirmation email unless the
/// provider signs the user in straight away.
pub async fn signup(
    State(state): State<AppState>,
    device: DeviceId,
    jar: CookieJar,
    Json(body): Json<SignupBody>,
) -> Result<Response, ApiError> {
    validate_signup(&body).map_err(|msg| api_error(StatusCode::BAD_REQUEST, msg))?;

    let pkce = PkcePair::generate();
    let request = SignUpRequest {
        email: body.email.trim().to_owned(),
        password: body.password,
        name: body.name.trim().to_owned(),
        role: Role::from_is_employer(body.is_employer),
        redirect_to: Some(format!("{}/auth/callback", state.settings.site_url)),
        code_challenge: Some(pkce.challenge),
    };
    let outcome = state.provider.sign_up(request).await.map_err(|e| {
        tracing::warn!(error = %e, "sign up failed");
        provider_error_response(&e)
    })?;

    tracing::info!(user_id = %outcome.user.id, role = ?outcome.user.role, "account created");
    let confirmation_required = outcome.session.is_none();
    // The confirmation link comes back with a code that needs this verifier.
    let jar = match &outcome.session {
        Some(session) => establish_session(&state, device, jar, session).await,
        None => session::set_verifier_cookie(jar, &pkce.verifier, state.settings.cookie_secure),
    };
    let body = serde_json::json!({
        "user": outcome.user,
        "confirmation_required": confirmation_required,
    });
    Ok((StatusCode::CREATED, jar, Json(body)).into_response())
}

// =============================================================================
// SIGN IN
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

async fn password_sign_in(state: &AppState, body: &LoginBody) -> Result<ProviderSession, ApiError> {
    if is_blank(&body.email) || body.password.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Please enter both email and password"));
    }
    state
        .provider
        .sign_in_with_password(body.email.trim(), &body.password)
        .await
        .map_err(|e| {
            if e.is_unconfirmed_email() {
                let body = serde_json::json!({ "error": e.user_message(), "needs_verification": true });
                return (StatusCode::UNAUTHORIZED, Json(body));
            }
            tracing::warn!(error = %e, "password sign in failed");
            match &e {
                ProviderError::Rejected { .. } => api_error(StatusCode::UNAUTHORIZED, &e.user_message()),
                _ => provider_error_response(&e),
            }
        })
}

fn signed_in_body(user: &Identity) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": user, "redirect": user.role.dashboard_path() }))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    device: DeviceId,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let session = password_sign_in(&state, &body).await?;
    let jar = establish_session(&state, device, jar, &session).await;
    Ok((jar, signed_in_body(&session.user)).into_response())
}

/// `POST /api/auth/employer/login`: like `login`, but job-seeker accounts are
/// signed straight back out.
pub async fn employer_login(
    State(state): State<AppState>,
    device: DeviceId,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let session = password_sign_in(&state, &body).await?;
    if !session.user.role.is_employer() {
        if let Err(e) = state.provider.sign_out(&session.access_token).await {
            tracing::warn!(error = %e, "sign out of non-employer session failed");
        }
        return Err(api_error(StatusCode::FORBIDDEN, EMPLOYER_ONLY_MESSAGE));
    }
    let jar = establish_session(&state, device, jar, &session).await;
    Ok((jar, signed_in_body(&session.user)).into_response())
}

// =============================================================================
// SIGN OUT / VERIFICATION
// =============================================================================

/// `POST /api/auth/logout`: end the provider session, forget the fallback
/// identity and clear cookies. Always succeeds from the browser's view.
pub async fn logout(State(state): State<AppState>, device: DeviceId, jar: CookieJar) -> impl IntoResponse {
    let tokens = SessionTokens::from_jar(&jar);
    if let Err(e) = session::revoke(state.provider.as_ref(), &tokens).await {
        tracing::warn!(error = %e, "provider sign out failed");
    }
    fallback::forget(state.fallback.as_ref(), device).await;
    state.events.publish(device, AuthEventKind::SignedOut);

    let jar = session::clear_session_cookies(jar, state.settings.cookie_secure);
    (jar, StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ResendBody {
    #[serde(default)]
    pub email: String,
}

/// `POST /api/auth/resend`: send the confirmation email again.
pub async fn resend(
    State(state): State<AppState>,
    Json(body): Json<ResendBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if is_blank(&body.email) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Please enter your email address"));
    }
    state
        .provider
        .resend_verification(body.email.trim())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "resend verification failed");
            provider_error_response(&e)
        })?;
    Ok(Json(serde_json::json!({ "sent": true })))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// `GET /auth/callback`: land from the verification email, trade the code
/// for a session and go to the right dashboard.
pub async fn callback(
    State(state): State<AppState>,
    device: DeviceId,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return Redirect::temporary(Role::JobSeeker.dashboard_path()).into_response();
    };
    let Some(verifier) = session::verifier_from_jar(&jar) else {
        tracing::warn!("auth callback without a code verifier cookie");
        return Redirect::temporary(CALLBACK_FAILED_PATH).into_response();
    };

    let jar = session::clear_verifier_cookie(jar, state.settings.cookie_secure);
    match state.provider.exchange_code_for_session(&code, &verifier).await {
        Ok(session) => {
            let jar = establish_session(&state, device, jar, &session).await;
            (jar, Redirect::temporary(session.user.role.dashboard_path())).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "auth code exchange failed");
            (jar, Redirect::temporary(CALLBACK_FAILED_PATH)).into_response()
        }
    }
}

// =============================================================================
// AUTH STATE
// =============================================================================

/// `GET /api/auth/me`: return the current user.
pub async fn me(auth: AuthUser) -> Json<Identity> {
    Json(auth.user)
}

/// Write back a session the watcher refreshed while resolving.
fn adopt_watcher_refresh(state: &AppState, device: DeviceId, jar: CookieJar, watcher: &mut AuthWatcher) -> CookieJar {
    match watcher.take_refreshed() {
        Some(refreshed) => state.adopt_refreshed(Some(device), jar, &refreshed),
        None => jar,
    }
}

/// `GET /api/auth/state`: reconciled auth state for this device.
pub async fn auth_state(
    State(state): State<AppState>,
    device: DeviceId,
    jar: CookieJar,
) -> (CookieJar, Json<AuthSnapshot>) {
    let mut watcher = state.watcher(device, SessionTokens::from_jar(&jar));
    let snapshot = watcher.resolve().await;
    let jar = adopt_watcher_refresh(&state, device, jar, &mut watcher);
    (jar, Json(snapshot))
}

/// `GET /api/auth/events`: the resolved auth state, then one snapshot per
/// auth change on this device.
pub async fn auth_events(
    State(state): State<AppState>,
    device: DeviceId,
    jar: CookieJar,
) -> (CookieJar, Sse<impl Stream<Item = Result<Event, axum::Error>>>) {
    let rx = state.events.subscribe();
    let mut watcher = state.watcher(device, SessionTokens::from_jar(&jar));
    // Resolve before the headers go out so refreshed cookies ride along.
    watcher.resolve().await;
    let jar = adopt_watcher_refresh(&state, device, jar, &mut watcher);
    let stream = watcher
        .into_stream(rx)
        .map(|snapshot| Event::default().event("auth").json_data(snapshot));
    (jar, Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
