//! Service configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (if present), then builds an `AppConfig` once. The
//! provider section is mandatory: without the endpoint URL and public key no
//! request can be authenticated, so startup aborts instead of serving a
//! half-working app.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PROVIDER_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROVIDER_CONNECT_TIMEOUT_SECS: u64 = 10;

const PROVIDER_URL_VAR: &str = "SUPABASE_URL";
const PROVIDER_KEY_VAR: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    MissingVar { var: &'static str },
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Endpoint and public key of the hosted auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: String,
    pub anon_key: String,
    pub timeouts: ProviderTimeouts,
}

impl ProviderConfig {
    /// Read `SUPABASE_URL` and `SUPABASE_ANON_KEY` (both required, non-blank)
    /// plus the optional timeout overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when either required variable is
    /// unset or blank, and [`ConfigError::Invalid`] when the URL has no
    /// `http(s)` scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = required_var(PROVIDER_URL_VAR)?;
        let anon_key = required_var(PROVIDER_KEY_VAR)?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::Invalid { var: PROVIDER_URL_VAR, reason: format!("expected http(s) URL, got {url}") });
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_owned(),
            anon_key,
            timeouts: ProviderTimeouts {
                request_secs: env_parse("PROVIDER_REQUEST_TIMEOUT_SECS", DEFAULT_PROVIDER_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("PROVIDER_CONNECT_TIMEOUT_SECS", DEFAULT_PROVIDER_CONNECT_TIMEOUT_SECS),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardConfig {
    /// Let requests through unguarded when the provider cannot be reached.
    pub fail_open: bool,
}

/// Top-level configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Public origin of this service, used to build provider redirect links.
    pub site_url: String,
    pub provider: ProviderConfig,
    pub guard: GuardConfig,
    /// Directory for the file-backed fallback store. `None` keeps it in memory.
    pub fallback_dir: Option<PathBuf>,
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Build the full configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when the provider section is missing or `PORT` is not a valid
    /// port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = ProviderConfig::from_env()?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid { var: "PORT", reason: e.to_string() })?,
            Err(_) => DEFAULT_PORT,
        };

        let site_url = std::env::var("SITE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| site_url.starts_with("https://"));

        Ok(Self {
            port,
            site_url,
            provider,
            guard: GuardConfig { fail_open: env_bool("GUARD_FAIL_OPEN").unwrap_or(false) },
            fallback_dir: std::env::var("FALLBACK_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            cookie_secure,
        })
    }
}

fn required_var(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar { var })
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
