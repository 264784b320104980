//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the API server with its full
//! configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, oauth};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let oauth_opts = oauth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret: auth_opts.token_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        cookie_secure: auth_opts.cookie_secure,
        frontend_base_url: auth_opts.frontend_base_url,
        oauth_client_id: oauth_opts.client_id,
        oauth_redirect_url: oauth_opts.redirect_url,
        oauth_handshake_ttl_seconds: oauth_opts.handshake_ttl_seconds,
        oauth_auth_url: oauth_opts.auth_url,
        oauth_token_url: oauth_opts.token_url,
        oauth_userinfo_url: oauth_opts.userinfo_url,
    }))
}
