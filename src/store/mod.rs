//! Credential store: the `users` table behind the auth endpoints.
//!
//! The rest of the platform owns the full user profile; this module only
//! touches the columns the auth layer needs (identity, stored hash, role).

use anyhow::{Context, Result, anyhow};
use sqlx::{PgPool, Row};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::token::Role;

/// Identity columns for one user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string; `None` for accounts created via external sign-in.
    pub password_hash: Option<String>,
    pub role: Role,
}

/// Existence check result for the pre-login email probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialSummary {
    pub exists: bool,
    pub has_password: bool,
}

/// Look up a user by normalized email.
///
/// # Errors
///
/// Returns an error on query failure or an unknown role value in the row.
pub async fn find_by_email(pool: &PgPool, email_normalized: &str) -> Result<Option<UserRecord>> {
    let query = r"
        SELECT id, username, email, password_hash, role::text AS role
        FROM users
        WHERE email_normalized = $1
        LIMIT 1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email_normalized)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to look up user by email")?;

    row.map(user_from_row).transpose()
}

/// Existence and password presence for an email, for the pre-login probe.
///
/// # Errors
///
/// Returns an error on query failure.
pub async fn credential_summary(
    pool: &PgPool,
    email_normalized: &str,
) -> Result<CredentialSummary> {
    let query = r"
        SELECT (password_hash IS NOT NULL) AS has_password
        FROM users
        WHERE email_normalized = $1
        LIMIT 1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email_normalized)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check user existence")?;

    Ok(match row {
        Some(row) => CredentialSummary {
            exists: true,
            has_password: row.get("has_password"),
        },
        None => CredentialSummary {
            exists: false,
            has_password: false,
        },
    })
}

/// Resolve or create the local user for an OAuth sign-in, keyed by the
/// provider-verified email. New accounts get the `user` role; existing rows
/// keep whatever role they already have.
///
/// # Errors
///
/// Returns an error on query failure or an unknown role value in the row.
pub async fn resolve_or_create_oauth_user(
    pool: &PgPool,
    email: &str,
    email_normalized: &str,
) -> Result<UserRecord> {
    let username = username_from_email(email_normalized);
    let query = r"
        INSERT INTO users (username, email, email_normalized, role)
        VALUES ($1, $2, $3, 'user')
        ON CONFLICT (email_normalized)
        DO UPDATE SET updated_at = NOW()
        RETURNING id, username, email, password_hash, role::text AS role
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(&username)
        .bind(email)
        .bind(email_normalized)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to resolve OAuth user")?;

    user_from_row(row)
}

fn user_from_row(row: sqlx::postgres::PgRow) -> Result<UserRecord> {
    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|err| anyhow!("user row carries an {err}"))?;
    Ok(UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
    })
}

/// Default username for accounts minted by the OAuth path.
fn username_from_email(email_normalized: &str) -> String {
    email_normalized
        .split('@')
        .next()
        .unwrap_or(email_normalized)
        .to_string()
}
