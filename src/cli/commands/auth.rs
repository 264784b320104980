use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[derive(Debug, Clone)]
pub struct Options {
    pub token_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub frontend_base_url: String,
}

impl Options {
    /// Parse session/token arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .filter(|value| !value.trim().is_empty());
        let Some(token_secret) = token_secret else {
            anyhow::bail!("missing required argument: --{ARG_TOKEN_SECRET}");
        };

        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(crate::token::DEFAULT_TOKEN_TTL_SECONDS);

        let cookie_secure = matches
            .get_one::<bool>(ARG_COOKIE_SECURE)
            .copied()
            .unwrap_or(true);

        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .unwrap_or_else(|| "https://app.pulse.dev".to_string());

        Ok(Self {
            token_secret: SecretString::from(token_secret),
            token_ttl_seconds,
            cookie_secure,
            frontend_base_url,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Symmetric secret for signing session tokens")
                .long_help(
                    "Symmetric secret for signing session tokens (HS256). Provide it via the environment in production; it is never logged.",
                )
                .env("PULSE_TOKEN_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token TTL in seconds")
                .env("PULSE_TOKEN_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Set the Secure attribute on cookies (disable for local development)")
                .env("PULSE_COOKIE_SECURE")
                .default_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL used for CORS and redirect targets")
                .env("PULSE_FRONTEND_BASE_URL")
                .default_value("https://app.pulse.dev"),
        )
}
