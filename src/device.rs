//! Per-browser device identity.
//!
//! Every browser gets a random id in a long-lived cookie. It partitions the
//! fallback identity store and scopes auth-change notifications, the same way
//! a browser's local storage is private to that browser.

use std::fmt;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

pub const DEVICE_COOKIE: &str = "jobswipe_device";
const DEVICE_COOKIE_MAX_AGE_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ensure the request carries a [`DeviceId`] extension, issuing the cookie on
/// the response when the browser did not send one.
pub async fn assign_device(jar: CookieJar, mut req: Request, next: Next) -> Response {
    let existing = jar.get(DEVICE_COOKIE).and_then(|c| DeviceId::parse(c.value()));
    let device = existing.unwrap_or_else(DeviceId::generate);
    req.extensions_mut().insert(device);

    let response = next.run(req).await;
    if existing.is_some() {
        return response;
    }

    let cookie = Cookie::build((DEVICE_COOKIE, device.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(DEVICE_COOKIE_MAX_AGE_DAYS));
    (jar.add(cookie), response).into_response()
}

impl<S> FromRequestParts<S> for DeviceId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(device) = parts.extensions.get::<Self>() {
            return Ok(*device);
        }
        // Routers mounted without `assign_device` still get a usable id.
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(jar
            .get(DEVICE_COOKIE)
            .and_then(|c| Self::parse(c.value()))
            .unwrap_or_else(Self::generate))
    }
}
