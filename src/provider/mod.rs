//! Hosted authentication provider: client handle and neutral types.
//!
//! DESIGN
//! ======
//! The provider is reached through the object-safe [`AuthProvider`] trait so
//! handlers, the route guard and the auth-state watcher share one injected
//! `Arc<dyn AuthProvider>` built at startup. The HTTP implementation keeps no
//! per-user state; every user-scoped call takes the caller's token, so one
//! handle safely serves all requests.

pub mod gotrue;
pub mod pkce;
pub mod types;

pub use gotrue::GoTrueClient;
pub use types::{Identity, ProviderError, ProviderSession, Role, SignUpOutcome, SignUpRequest};

/// Operations this service consumes from the auth provider.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account. Role and display name travel as user metadata.
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, ProviderError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Look up the user behind `access_token`. `Ok(None)` means the provider
    /// answered and there is no valid session.
    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, ProviderError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError>;

    async fn resend_verification(&self, email: &str) -> Result<(), ProviderError>;

    /// Complete an email-link redirect with the PKCE verifier whose challenge
    /// was sent at sign-up.
    async fn exchange_code_for_session(&self, code: &str, code_verifier: &str) -> Result<ProviderSession, ProviderError>;
}
