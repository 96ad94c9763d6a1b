//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the auth API, the provider callback, and the
//! job-seeker and employer pages. Every request first gets a device id, then
//! passes the route guard, which redirects or lets it through with the
//! resolved identity attached.

pub mod auth;
pub mod employer;
pub mod pages;
pub mod seeker;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::device::assign_device;
use crate::guard::route_guard;
use crate::state::AppState;

/// Error body shared by JSON handlers: `{ "error": message }`.
pub(crate) type ApiError = (StatusCode, Json<serde_json::Value>);

pub(crate) fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": message })))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/employer/login", post(auth::employer_login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/resend", post(auth::resend))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/state", get(auth::auth_state))
        .route("/api/auth/events", get(auth::auth_events))
        .route("/auth/callback", get(auth::callback))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(auth_routes())
        .merge(pages::routes())
        .merge(seeker::routes())
        .merge(employer::routes())
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(middleware::from_fn(assign_device))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use axum::response::Response;

    use crate::services::session::ACCESS_COOKIE;

    /// Build a request, optionally carrying an access-token cookie and a JSON body.
    pub fn request(method: Method, path: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let cookie = token.map(|t| format!("{ACCESS_COOKIE}={t}")).unwrap_or_default();
        request_with_cookie(method, path, &cookie, body)
    }

    /// Build a request with a raw `Cookie` header (empty for none).
    pub fn request_with_cookie(
        method: Method,
        path: &str,
        cookie: &str,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if !cookie.is_empty() {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub fn location(resp: &Response) -> String {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    }

    pub fn set_cookies(resp: &Response) -> Vec<String> {
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_owned))
            .collect()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
