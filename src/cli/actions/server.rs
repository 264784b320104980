use crate::{api, oauth::OAuthConfig};
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub frontend_base_url: String,
    pub oauth_client_id: String,
    pub oauth_redirect_url: String,
    pub oauth_handshake_ttl_seconds: i64,
    pub oauth_auth_url: Option<String>,
    pub oauth_token_url: Option<String>,
    pub oauth_userinfo_url: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if configuration URLs are invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let redirect_url: Url = args
        .oauth_redirect_url
        .parse()
        .with_context(|| format!("Invalid OAuth redirect URL: {}", args.oauth_redirect_url))?;

    let mut oauth_config = OAuthConfig::new(args.oauth_client_id, redirect_url);
    if let Some(url) = &args.oauth_auth_url {
        oauth_config = oauth_config.with_auth_url(parse_url("OAuth authorization URL", url)?);
    }
    if let Some(url) = &args.oauth_token_url {
        oauth_config = oauth_config.with_token_url(parse_url("OAuth token URL", url)?);
    }
    if let Some(url) = &args.oauth_userinfo_url {
        oauth_config = oauth_config.with_userinfo_url(parse_url("OAuth userinfo URL", url)?);
    }

    let auth_config = api::handlers::auth::AuthConfig::new(args.frontend_base_url)
        .with_cookie_secure(args.cookie_secure)
        .with_session_ttl_seconds(args.token_ttl_seconds)
        .with_handshake_ttl_seconds(args.oauth_handshake_ttl_seconds);

    api::new(
        args.port,
        args.dsn,
        args.token_secret,
        auth_config,
        oauth_config,
    )
    .await
}

fn parse_url(what: &str, value: &str) -> Result<Url> {
    value.parse().with_context(|| format!("Invalid {what}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_debug_redacts_secret() {
        let args = Args {
            port: 8080,
            dsn: "postgres://localhost/pulse".to_string(),
            token_secret: SecretString::from("super-secret".to_string()),
            token_ttl_seconds: 604_800,
            cookie_secure: true,
            frontend_base_url: "https://app.pulse.dev".to_string(),
            oauth_client_id: "client-id".to_string(),
            oauth_redirect_url: "https://api.pulse.dev/callback".to_string(),
            oauth_handshake_ttl_seconds: 600,
            oauth_auth_url: None,
            oauth_token_url: None,
            oauth_userinfo_url: None,
        };
        let printed = format!("{args:?}");
        assert!(!printed.contains("super-secret"));
    }
}
