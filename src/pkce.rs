//! PKCE material for the OAuth handshake.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Generate the anti-CSRF `state` parameter: 16 random bytes, base64url.
///
/// # Errors
///
/// Returns an error if the OS random source fails.
pub fn generate_state() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate handshake state")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate the PKCE code verifier: 64 random bytes, base64url.
///
/// The encoded value is 86 characters, within the 43-128 range of RFC 7636.
///
/// # Errors
///
/// Returns an error if the OS random source fails.
pub fn generate_code_verifier() -> Result<String> {
    let mut bytes = [0u8; 64];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate code verifier")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Derive the S256 code challenge: `base64url(sha256(verifier))`.
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
