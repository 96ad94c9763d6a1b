//! GoTrue (Supabase Auth) REST client.
//!
//! Thin HTTP wrapper over `/auth/v1`. Response handling lives in the pure
//! `parse_*` functions so it can be tested without a live provider.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::AuthProvider;
use super::pkce::CHALLENGE_METHOD;
use super::types::{Identity, ProviderError, ProviderSession, Role, SignUpOutcome, SignUpRequest};
use crate::config::ProviderConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    /// Build the client from validated provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::HttpClientBuild`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.url.clone(), anon_key: config.anon_key.clone() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), ProviderError> {
        let response = request
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        Ok((status, body))
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<ProviderSession, ProviderError> {
        let request = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let (status, text) = self.send(request).await?;
        if !is_success(status) {
            return Err(rejected(status, &text));
        }
        parse_session(&text)
    }
}

#[async_trait::async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, ProviderError> {
        let mut builder = self.http.post(self.endpoint("signup"));
        if let Some(redirect_to) = &request.redirect_to {
            builder = builder.query(&[("redirect_to", redirect_to.as_str())]);
        }
        let builder = builder.json(&sign_up_body(&request));

        let (status, text) = self.send(builder).await?;
        if !is_success(status) {
            return Err(rejected(status, &text));
        }
        parse_sign_up(&text)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError> {
        self.token_grant("password", serde_json::json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let request = self
            .http
            .post(self.endpoint("logout"))
            .bearer_auth(access_token);
        let (status, text) = self.send(request).await?;
        // An already-expired session is as signed out as it gets.
        if is_success(status) || status == StatusCode::UNAUTHORIZED.as_u16() {
            return Ok(());
        }
        Err(rejected(status, &text))
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, ProviderError> {
        let request = self
            .http
            .get(self.endpoint("user"))
            .bearer_auth(access_token);
        let (status, text) = self.send(request).await?;
        if status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16() {
            return Ok(None);
        }
        if !is_success(status) {
            return Err(rejected(status, &text));
        }
        parse_user(&text).map(Some)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        self.token_grant("refresh_token", serde_json::json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn resend_verification(&self, email: &str) -> Result<(), ProviderError> {
        let request = self
            .http
            .post(self.endpoint("resend"))
            .json(&serde_json::json!({ "type": "signup", "email": email }));
        let (status, text) = self.send(request).await?;
        if !is_success(status) {
            return Err(rejected(status, &text));
        }
        Ok(())
    }

    async fn exchange_code_for_session(&self, code: &str, code_verifier: &str) -> Result<ProviderSession, ProviderError> {
        self.token_grant("pkce", pkce_grant_body(code, code_verifier))
            .await
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// `/signup` body. Role and display name travel as user metadata.
pub(crate) fn sign_up_body(request: &SignUpRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "email": request.email,
        "password": request.password,
        "data": {
            "name": request.name,
            "isEmployer": request.role.is_employer(),
        },
    });
    if let Some(challenge) = &request.code_challenge {
        body["code_challenge"] = serde_json::Value::from(challenge.as_str());
        body["code_challenge_method"] = serde_json::Value::from(CHALLENGE_METHOD);
    }
    body
}

/// `/token?grant_type=pkce` body.
pub(crate) fn pkce_grant_body(code: &str, code_verifier: &str) -> serde_json::Value {
    serde_json::json!({ "auth_code": code, "code_verifier": code_verifier })
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: RawUser,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn rejected(status: u16, body: &str) -> ProviderError {
    ProviderError::Rejected { status, message: parse_error_message(body) }
}

fn identity_from_raw(raw: RawUser, session_expiry: Option<i64>) -> Identity {
    let meta = &raw.user_metadata;
    let is_employer = meta
        .get("isEmployer")
        .or_else(|| meta.get("is_employer"))
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    let name = meta
        .get("name")
        .and_then(serde_json::Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .map(str::to_owned);

    Identity {
        id: raw.id,
        email: raw.email.unwrap_or_default(),
        name,
        role: Role::from_is_employer(is_employer),
        session_expiry,
    }
}

/// Parse a `/user` response body into an [`Identity`].
pub(crate) fn parse_user(body: &str) -> Result<Identity, ProviderError> {
    let raw: RawUser = serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(identity_from_raw(raw, None))
}

/// Parse a `/token` response body into a [`ProviderSession`].
pub(crate) fn parse_session(body: &str) -> Result<ProviderSession, ProviderError> {
    let raw: RawSession = serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let user = identity_from_raw(raw.user, raw.expires_at);
    Ok(ProviderSession {
        access_token: raw.access_token,
        refresh_token: raw.refresh_token,
        expires_at: raw.expires_at,
        expires_in: raw.expires_in,
        user,
    })
}

/// `/signup` answers with a full session when auto-confirm is on, or with the
/// bare user while the confirmation email is pending.
pub(crate) fn parse_sign_up(body: &str) -> Result<SignUpOutcome, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    if value.get("access_token").is_some() {
        let session = parse_session(body)?;
        return Ok(SignUpOutcome { user: session.user.clone(), session: Some(session) });
    }
    let user = parse_user(body)?;
    Ok(SignUpOutcome { user, session: None })
}

/// Pull a human-readable message out of a provider error body.
pub(crate) fn parse_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_owned();
    };
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map_or_else(|| body.trim().to_owned(), str::to_owned)
}

#[cfg(test)]
#[path = "gotrue_test.rs"]
mod tests;
