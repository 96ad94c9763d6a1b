//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the auth provider client (built once at startup), the fallback
//! identity store, the auth event hub, and a map of per-user workspaces. Each
//! workspace is seeded from sample data the first time its user touches a
//! page and lives only in memory.

use std::collections::HashMap;
use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::GuardConfig;
use crate::device::DeviceId;
use crate::provider::{AuthProvider, Identity, ProviderSession};
use crate::services::auth_state::{AuthEventKind, AuthEvents, AuthWatcher};
use crate::services::catalog::{self, Match};
use crate::services::chat::ChatThread;
use crate::services::employer::{CandidateQueue, PostedJob};
use crate::services::fallback::FallbackStore;
use crate::services::jobs::JobBrowser;
use crate::services::profile::{CompanyProfile, SeekerProfile};
use crate::services::session::{self, SessionTokens};

// =============================================================================
// WORKSPACE
// =============================================================================

/// One user's view state. Both halves are always present; the route guard
/// decides which half a user can reach.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub browser: JobBrowser,
    pub matches: Vec<Match>,
    /// Open chat threads keyed by company id.
    pub chats: HashMap<u32, ChatThread>,
    pub profile: SeekerProfile,
    pub company: CompanyProfile,
    pub candidates: CandidateQueue,
    pub posted_jobs: Vec<PostedJob>,
}

impl Workspace {
    #[must_use]
    pub fn for_user(user: &Identity) -> Self {
        Self {
            browser: JobBrowser::default(),
            matches: catalog::sample_matches(),
            chats: HashMap::new(),
            profile: SeekerProfile::for_user(user.name.as_deref()),
            company: CompanyProfile::default(),
            candidates: CandidateQueue::default(),
            posted_jobs: Vec::new(),
        }
    }

    /// Chat thread for a company, opened from seed data on first use.
    pub fn chat(&mut self, company_id: u32) -> Option<&mut ChatThread> {
        if !self.chats.contains_key(&company_id) {
            let thread = ChatThread::open(company_id)?;
            self.chats.insert(company_id, thread);
        }
        self.chats.get_mut(&company_id)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Request-independent settings handlers need.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site_url: String,
    pub cookie_secure: bool,
    pub guard: GuardConfig,
}

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn AuthProvider>,
    pub fallback: Arc<dyn FallbackStore>,
    pub events: AuthEvents,
    pub workspaces: Arc<RwLock<HashMap<Uuid, Workspace>>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>, fallback: Arc<dyn FallbackStore>, settings: Settings) -> Self {
        Self {
            provider,
            fallback,
            events: AuthEvents::default(),
            workspaces: Arc::new(RwLock::new(HashMap::new())),
            settings: Arc::new(settings),
        }
    }

    /// Run `f` against the user's workspace, creating it on first use.
    pub async fn with_workspace<R>(&self, user: &Identity, f: impl FnOnce(&mut Workspace) -> R) -> R {
        let mut workspaces = self.workspaces.write().await;
        let workspace = workspaces.entry(user.id).or_insert_with(|| Workspace::for_user(user));
        f(workspace)
    }

    /// Auth state watcher for one device and the session tokens it sent.
    #[must_use]
    pub fn watcher(&self, device: DeviceId, tokens: SessionTokens) -> AuthWatcher {
        AuthWatcher::new(self.provider.clone(), self.fallback.clone(), device, tokens)
    }

    /// Announce a refreshed session to the device's subscribers and write the
    /// new token pair into the response cookies.
    #[must_use]
    pub fn adopt_refreshed(&self, device: Option<DeviceId>, jar: CookieJar, refreshed: &ProviderSession) -> CookieJar {
        if let Some(device) = device {
            self.events.publish(device, AuthEventKind::TokenRefreshed(refreshed.user.clone()));
        }
        session::set_session_cookies(jar, refreshed, self.settings.cookie_secure)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::provider::{ProviderError, ProviderSession, Role, SignUpOutcome, SignUpRequest};
    use crate::services::fallback::MemoryFallbackStore;

    /// Build an identity with a display name taken from the address.
    #[must_use]
    pub fn identity(email: &str, role: Role) -> Identity {
        let name = email.split('@').next().map(str::to_owned);
        Identity { id: Uuid::new_v4(), email: email.to_owned(), name, role, session_expiry: None }
    }

    #[must_use]
    pub fn test_settings() -> Settings {
        Settings { site_url: "http://localhost:3000".into(), cookie_secure: false, guard: GuardConfig::default() }
    }

    /// Create a test `AppState` backed by an empty mock provider.
    #[must_use]
    pub fn test_app_state() -> AppState {
        test_app_state_with(Arc::new(MockProvider::new()))
    }

    /// Create a test `AppState` around a configured mock provider.
    #[must_use]
    pub fn test_app_state_with(provider: Arc<MockProvider>) -> AppState {
        AppState::new(provider, Arc::new(MemoryFallbackStore::new()), test_settings())
    }

    struct MockAccount {
        password: String,
        identity: Identity,
        confirmed: bool,
    }

    /// In-memory stand-in for the hosted provider.
    ///
    /// Password sign-in issues `at-{email}` / `rt-{email}`; those tokens are
    /// then accepted by `get_user` and `refresh_session`.
    #[derive(Default)]
    pub struct MockProvider {
        sessions: Mutex<HashMap<String, Identity>>,
        refresh_tokens: Mutex<HashMap<String, Identity>>,
        /// Auth code -> (expected PKCE verifier, user).
        codes: Mutex<HashMap<String, (String, Identity)>>,
        code_challenges: Mutex<Vec<Option<String>>>,
        accounts: Mutex<HashMap<String, MockAccount>>,
        failing: AtomicBool,
        auto_confirm: AtomicBool,
        signed_out: Mutex<Vec<String>>,
        resent: Mutex<Vec<String>>,
    }

    impl MockProvider {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Accept `token` as a live access token for `user`.
        pub fn with_user(&self, token: &str, user: Identity) {
            self.sessions.lock().unwrap().insert(token.to_owned(), user);
        }

        pub fn with_refresh_token(&self, token: &str, user: Identity) {
            self.refresh_tokens.lock().unwrap().insert(token.to_owned(), user);
        }

        /// Accept `code` once, only together with `verifier`.
        pub fn with_code(&self, code: &str, verifier: &str, user: Identity) {
            self.codes.lock().unwrap().insert(code.to_owned(), (verifier.to_owned(), user));
        }

        pub fn with_account(&self, password: &str, user: Identity) {
            self.insert_account(password, user, true);
        }

        pub fn with_unconfirmed_account(&self, password: &str, user: Identity) {
            self.insert_account(password, user, false);
        }

        fn insert_account(&self, password: &str, identity: Identity, confirmed: bool) {
            let account = MockAccount { password: password.to_owned(), identity, confirmed };
            self.accounts.lock().unwrap().insert(account.identity.email.clone(), account);
        }

        /// Make every call fail as if the provider were unreachable.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Sign-ups return a session immediately instead of awaiting email
        /// confirmation.
        pub fn set_auto_confirm(&self, auto_confirm: bool) {
            self.auto_confirm.store(auto_confirm, Ordering::SeqCst);
        }

        #[must_use]
        pub fn signed_out(&self) -> Vec<String> {
            self.signed_out.lock().unwrap().clone()
        }

        #[must_use]
        pub fn resent(&self) -> Vec<String> {
            self.resent.lock().unwrap().clone()
        }

        /// PKCE challenges received by `sign_up`, in call order.
        #[must_use]
        pub fn code_challenges(&self) -> Vec<Option<String>> {
            self.code_challenges.lock().unwrap().clone()
        }

        #[must_use]
        pub fn has_account(&self, email: &str) -> bool {
            self.accounts.lock().unwrap().contains_key(email)
        }

        fn check_up(&self) -> Result<(), ProviderError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ProviderError::Request("connection refused".into()));
            }
            Ok(())
        }

        fn issue_session(&self, user: Identity) -> ProviderSession {
            let access_token = format!("at-{}", user.email);
            let refresh_token = format!("rt-{}", user.email);
            self.sessions.lock().unwrap().insert(access_token.clone(), user.clone());
            self.refresh_tokens.lock().unwrap().insert(refresh_token.clone(), user.clone());
            ProviderSession { access_token, refresh_token, expires_at: None, expires_in: Some(3600), user }
        }
    }

    fn rejected(status: u16, message: &str) -> ProviderError {
        ProviderError::Rejected { status, message: message.to_owned() }
    }

    #[async_trait::async_trait]
    impl AuthProvider for MockProvider {
        async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, ProviderError> {
            self.check_up()?;
            self.code_challenges.lock().unwrap().push(request.code_challenge.clone());
            if self.has_account(&request.email) {
                return Err(rejected(422, "User already registered"));
            }
            let user = Identity {
                id: Uuid::new_v4(),
                email: request.email,
                name: Some(request.name),
                role: request.role,
                session_expiry: None,
            };
            let confirmed = self.auto_confirm.load(Ordering::SeqCst);
            self.insert_account(&request.password, user.clone(), confirmed);
            let session = confirmed.then(|| self.issue_session(user.clone()));
            Ok(SignUpOutcome { user, session })
        }

        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError> {
            self.check_up()?;
            let user = {
                let accounts = self.accounts.lock().unwrap();
                let account = accounts
                    .get(email)
                    .filter(|a| a.password == password)
                    .ok_or_else(|| rejected(400, "Invalid login credentials"))?;
                if !account.confirmed {
                    return Err(rejected(400, "Email not confirmed"));
                }
                account.identity.clone()
            };
            Ok(self.issue_session(user))
        }

        async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
            self.check_up()?;
            // Like the provider, ending a session also revokes its refresh tokens.
            if let Some(user) = self.sessions.lock().unwrap().remove(access_token) {
                self.refresh_tokens.lock().unwrap().retain(|_, owner| owner.id != user.id);
            }
            self.signed_out.lock().unwrap().push(access_token.to_owned());
            Ok(())
        }

        async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, ProviderError> {
            self.check_up()?;
            Ok(self.sessions.lock().unwrap().get(access_token).cloned())
        }

        async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
            self.check_up()?;
            let user = self
                .refresh_tokens
                .lock()
                .unwrap()
                .remove(refresh_token)
                .ok_or_else(|| rejected(400, "Invalid Refresh Token"))?;
            Ok(self.issue_session(user))
        }

        async fn resend_verification(&self, email: &str) -> Result<(), ProviderError> {
            self.check_up()?;
            self.resent.lock().unwrap().push(email.to_owned());
            Ok(())
        }

        async fn exchange_code_for_session(&self, code: &str, code_verifier: &str) -> Result<ProviderSession, ProviderError> {
            self.check_up()?;
            let (expected, user) = self
                .codes
                .lock()
                .unwrap()
                .remove(code)
                .ok_or_else(|| rejected(400, "invalid flow state, no valid flow state found"))?;
            if expected != code_verifier {
                return Err(rejected(400, "code challenge does not match previously saved code verifier"));
            }
            Ok(self.issue_session(user))
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
