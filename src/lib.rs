//! # Pulse (Authentication & Authorization)
//!
//! `pulse` is the authentication and authorization layer of the Pulse health
//! platform. It issues and verifies session tokens, drives the OAuth
//! authorization-code-with-PKCE handshake, and gates every protected request
//! through a role-aware middleware before the rest of the platform sees it.
//!
//! ## Sessions
//!
//! Sessions are stateless: identity claims (`sub`, `email`, `role`) ride in a
//! signed `HS256` token stored in an `HttpOnly` cookie. There is no
//! server-side session table, and therefore no early revocation; a token is
//! valid until its expiry.
//!
//! ## Authorization
//!
//! Roles form a closed set (`admin`, `user`, `practitioner`). Each role maps
//! to a fixed set of path prefixes; any path outside the caller's prefixes is
//! denied and redirected to the sign-in surface (deny-by-default).
//!
//! ## OAuth
//!
//! A single external provider (`google`) is supported. The handshake is a
//! standard PKCE flow: state and verifier live in short-lived browser
//! cookies, and the callback mints the same session token as direct login.

pub mod api;
pub mod cli;
pub mod gatekeeper;
pub mod oauth;
pub mod password;
pub mod pkce;
pub mod store;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
