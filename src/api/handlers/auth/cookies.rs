//! Session and handshake cookie construction and parsing.
//!
//! All cookies are `HttpOnly; SameSite=None; Path=/` per the frontend's
//! cross-site deployment; `Secure` is appended unless disabled for local
//! development. Clearing a cookie reuses the same attributes with
//! `Max-Age=0`.

use axum::http::{HeaderMap, HeaderValue, header::InvalidHeaderValue};

use super::AuthConfig;

pub(crate) const SESSION_COOKIE_NAME: &str = "auth_token";
pub(crate) const STATE_COOKIE_NAME: &str = "oauth_state";
pub(crate) const VERIFIER_COOKIE_NAME: &str = "oauth_verifier";

/// Session cookie carrying the signed token, 7 days by default.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(
        SESSION_COOKIE_NAME,
        token,
        config.session_ttl_seconds(),
        config.cookie_secure(),
    )
}

pub(crate) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(SESSION_COOKIE_NAME, "", 0, config.cookie_secure())
}

/// Handshake cookies holding `state` and `code_verifier` for one OAuth
/// attempt; they expire on their own if the provider never calls back.
pub(crate) fn handshake_cookies(
    config: &AuthConfig,
    state: &str,
    code_verifier: &str,
) -> Result<(HeaderValue, HeaderValue), InvalidHeaderValue> {
    let ttl = config.handshake_ttl_seconds();
    let secure = config.cookie_secure();
    Ok((
        build_cookie(STATE_COOKIE_NAME, state, ttl, secure)?,
        build_cookie(VERIFIER_COOKIE_NAME, code_verifier, ttl, secure)?,
    ))
}

/// Removal cookies so a consumed handshake cannot be replayed.
pub(crate) fn clear_handshake_cookies(
    config: &AuthConfig,
) -> Result<(HeaderValue, HeaderValue), InvalidHeaderValue> {
    let secure = config.cookie_secure();
    Ok((
        build_cookie(STATE_COOKIE_NAME, "", 0, secure)?,
        build_cookie(VERIFIER_COOKIE_NAME, "", 0, secure)?,
    ))
}

fn build_cookie(
    name: &str,
    value: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=None; Max-Age={max_age_seconds}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Session token from the request cookie jar, if present.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE_NAME)
}

/// Read one cookie value from the `Cookie` request header.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new("https://app.pulse.dev".to_string())
    }

    #[test]
    fn session_cookie_attributes() -> Result<(), InvalidHeaderValue> {
        let cookie = session_cookie(&config(), "tok")?;
        let cookie = cookie.to_str().expect("ascii cookie");
        assert!(cookie.starts_with("auth_token=tok; "));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.ends_with("Secure"));
        Ok(())
    }

    #[test]
    fn insecure_config_drops_secure_attribute() -> Result<(), InvalidHeaderValue> {
        let config = config().with_cookie_secure(false);
        let cookie = session_cookie(&config, "tok")?;
        assert!(!cookie.to_str().expect("ascii cookie").contains("Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_zeroes_max_age() -> Result<(), InvalidHeaderValue> {
        let cookie = clear_session_cookie(&config())?;
        let cookie = cookie.to_str().expect("ascii cookie");
        assert!(cookie.starts_with("auth_token=; "));
        assert!(cookie.contains("Max-Age=0"));
        Ok(())
    }

    #[test]
    fn handshake_cookies_short_lived() -> Result<(), InvalidHeaderValue> {
        let (state, verifier) = handshake_cookies(&config(), "st", "ver")?;
        assert!(state.to_str().expect("ascii").contains("Max-Age=600"));
        assert!(
            verifier
                .to_str()
                .expect("ascii")
                .starts_with("oauth_verifier=ver; ")
        );
        Ok(())
    }

    #[test]
    fn cookie_value_parses_jar() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("other=1; auth_token=abc; oauth_state=xyz"),
        );
        assert_eq!(session_token(&headers), Some("abc".to_string()));
        assert_eq!(
            cookie_value(&headers, STATE_COOKIE_NAME),
            Some("xyz".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_treated_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("auth_token="),
        );
        assert_eq!(session_token(&headers), None);
    }
}
