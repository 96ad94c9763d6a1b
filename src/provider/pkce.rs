//! PKCE (RFC 7636) verifier/challenge pairs for the email confirmation flow.
//!
//! Sign-up sends the S256 challenge to the provider; the verifier stays in the
//! browser's cookie until the confirmation link lands on `/auth/callback`,
//! where it is sent back with the auth code.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Method name the provider expects alongside the challenge.
pub const CHALLENGE_METHOD: &str = "s256";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Fresh random verifier (64 hex chars) and its challenge.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::rng().random();
        let mut verifier = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            let _ = write!(verifier, "{b:02x}");
        }
        let challenge = challenge_for(&verifier);
        Self { verifier, challenge }
    }
}

/// `BASE64URL(SHA256(verifier))` without padding.
#[must_use]
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
