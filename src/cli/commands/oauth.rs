use clap::{Arg, ArgMatches, Command};

pub const ARG_OAUTH_CLIENT_ID: &str = "oauth-client-id";
pub const ARG_OAUTH_REDIRECT_URL: &str = "oauth-redirect-url";
pub const ARG_HANDSHAKE_TTL_SECONDS: &str = "oauth-handshake-ttl-seconds";
pub const ARG_OAUTH_AUTH_URL: &str = "oauth-auth-url";
pub const ARG_OAUTH_TOKEN_URL: &str = "oauth-token-url";
pub const ARG_OAUTH_USERINFO_URL: &str = "oauth-userinfo-url";

#[derive(Debug, Clone)]
pub struct Options {
    pub client_id: String,
    pub redirect_url: String,
    pub handshake_ttl_seconds: i64,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub userinfo_url: Option<String>,
}

impl Options {
    /// Parse OAuth arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Helper to filter empty strings which clap might pass through if env vars are set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let Some(client_id) = get_non_empty(ARG_OAUTH_CLIENT_ID) else {
            anyhow::bail!("missing required argument: --{ARG_OAUTH_CLIENT_ID}");
        };
        let Some(redirect_url) = get_non_empty(ARG_OAUTH_REDIRECT_URL) else {
            anyhow::bail!("missing required argument: --{ARG_OAUTH_REDIRECT_URL}");
        };

        let handshake_ttl_seconds = matches
            .get_one::<i64>(ARG_HANDSHAKE_TTL_SECONDS)
            .copied()
            .unwrap_or(600);

        Ok(Self {
            client_id,
            redirect_url,
            handshake_ttl_seconds,
            auth_url: get_non_empty(ARG_OAUTH_AUTH_URL),
            token_url: get_non_empty(ARG_OAUTH_TOKEN_URL),
            userinfo_url: get_non_empty(ARG_OAUTH_USERINFO_URL),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_OAUTH_CLIENT_ID)
                .long(ARG_OAUTH_CLIENT_ID)
                .help("OAuth client identifier registered with the provider")
                .env("PULSE_OAUTH_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_OAUTH_REDIRECT_URL)
                .long(ARG_OAUTH_REDIRECT_URL)
                .help("Callback URL the provider redirects to after consent")
                .env("PULSE_OAUTH_REDIRECT_URL"),
        )
        .arg(
            Arg::new(ARG_HANDSHAKE_TTL_SECONDS)
                .long(ARG_HANDSHAKE_TTL_SECONDS)
                .help("Lifetime of the state/verifier handshake cookies")
                .env("PULSE_OAUTH_HANDSHAKE_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_OAUTH_AUTH_URL)
                .long(ARG_OAUTH_AUTH_URL)
                .help("Override the provider authorization endpoint (tests)")
                .env("PULSE_OAUTH_AUTH_URL"),
        )
        .arg(
            Arg::new(ARG_OAUTH_TOKEN_URL)
                .long(ARG_OAUTH_TOKEN_URL)
                .help("Override the provider token endpoint (tests)")
                .env("PULSE_OAUTH_TOKEN_URL"),
        )
        .arg(
            Arg::new(ARG_OAUTH_USERINFO_URL)
                .long(ARG_OAUTH_USERINFO_URL)
                .help("Override the provider userinfo endpoint (tests)")
                .env("PULSE_OAUTH_USERINFO_URL"),
        )
}
