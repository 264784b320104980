//! Static routing policy: public allow-list and the role→prefix table.

use crate::token::Role;

/// Sign-in surface served by the frontend; all denials land here.
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Exact paths reachable without authentication.
const PUBLIC_ROUTES: &[&str] = &["/", "/sign-in", "/sign-up", "/health"];

/// Prefixes reachable without authentication. `/api/auth` handlers
/// re-verify the session cookie themselves where they need identity.
const PUBLIC_PREFIXES: &[&str] = &["/api/auth"];

/// Path prefixes each role may access. Deny-by-default: anything not
/// matching an entry for the caller's role is rejected. Every protected
/// prefix appears under at least one role, or it is unreachable.
#[must_use]
pub const fn allowed_prefixes(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &["/admin", "/api"],
        Role::User => &["/user", "/api"],
        Role::Practitioner => &["/practitioner", "/api"],
    }
}

/// Strip a trailing slash so `/admin/` and `/admin` classify identically.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// Whether a normalized path is on the unauthenticated allow-list.
#[must_use]
pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path)
        || PUBLIC_PREFIXES
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
}

/// Whether a normalized path is allowed for the given role.
#[must_use]
pub fn path_allowed(role: Role, path: &str) -> bool {
    allowed_prefixes(role)
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slash() {
        assert_eq!(normalize_path("/admin/"), "/admin");
        assert_eq!(normalize_path("/admin"), "/admin");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn public_routes_and_prefixes() {
        assert!(is_public("/"));
        assert!(is_public("/sign-in"));
        assert!(is_public("/sign-up"));
        assert!(is_public("/health"));
        assert!(is_public("/api/auth"));
        assert!(is_public("/api/auth/login"));
        assert!(!is_public("/api/quests"));
        assert!(!is_public("/admin"));
        // Prefix match requires a path boundary.
        assert!(!is_public("/api/authx"));
    }

    #[test]
    fn role_prefixes_deny_by_default() {
        assert!(path_allowed(Role::User, "/user"));
        assert!(path_allowed(Role::User, "/user/quests"));
        assert!(path_allowed(Role::User, "/api/quests"));
        assert!(!path_allowed(Role::User, "/admin"));
        assert!(!path_allowed(Role::User, "/admin/settings"));
        assert!(!path_allowed(Role::User, "/practitioner"));
        assert!(!path_allowed(Role::User, "/userland"));

        assert!(path_allowed(Role::Admin, "/admin/settings"));
        assert!(!path_allowed(Role::Admin, "/user"));

        assert!(path_allowed(Role::Practitioner, "/practitioner/patients"));
        assert!(!path_allowed(Role::Practitioner, "/admin"));
    }

    #[test]
    fn every_role_covers_its_home_path() {
        for role in [Role::Admin, Role::User, Role::Practitioner] {
            assert!(
                path_allowed(role, role.home_path()),
                "home path of {role} must be reachable"
            );
        }
    }
}
