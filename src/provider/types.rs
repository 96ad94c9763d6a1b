//! Provider-neutral identity, session, and error types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by auth provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request never produced a response (DNS, TLS, timeout).
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider response body could not be deserialized.
    #[error("provider response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ProviderError {
    /// Sign-in was refused because the address has not been verified yet.
    #[must_use]
    pub fn is_unconfirmed_email(&self) -> bool {
        match self {
            Self::Rejected { message, .. } => {
                message.contains("Email not confirmed") || message.to_ascii_lowercase().contains("email confirmation")
            }
            _ => false,
        }
    }

    /// Message suitable for showing on a login or signup form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } if !message.is_empty() => message.clone(),
            Self::Rejected { .. } => "Invalid email or password".to_owned(),
            _ => "Authentication service unavailable".to_owned(),
        }
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Which side of the marketplace an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employer,
    JobSeeker,
}

impl Role {
    #[must_use]
    pub fn from_is_employer(is_employer: bool) -> Self {
        if is_employer { Self::Employer } else { Self::JobSeeker }
    }

    #[must_use]
    pub fn is_employer(self) -> bool {
        matches!(self, Self::Employer)
    }

    /// Landing page for a signed-in account of this role.
    #[must_use]
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Self::Employer => "/employer/dashboard",
            Self::JobSeeker => "/dashboard",
        }
    }
}

/// Authenticated user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
    /// Unix seconds at which the backing session expires, when known.
    #[serde(default)]
    pub session_expiry: Option<i64>,
}

/// A live provider session. Tokens are opaque to this service.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: Option<i64>,
    /// Seconds until expiry as reported at issue time.
    pub expires_in: Option<i64>,
    pub user: Identity,
}

// =============================================================================
// REQUESTS / OUTCOMES
// =============================================================================

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    /// Where the verification link in the confirmation email should land.
    pub redirect_to: Option<String>,
    /// S256 PKCE challenge; makes the confirmation link carry `?code=`.
    pub code_challenge: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: Identity,
    /// `None` while the provider waits for email confirmation.
    pub session: Option<ProviderSession>,
}
