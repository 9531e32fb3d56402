//! Role/path access policy.
//!
//! A pure, total function from (role, path) to an allow/deny decision. The
//! route guard and the API both consult it; nothing here performs I/O, so the
//! policy is unit-testable without any auth or network dependency.

use crate::StaffRole;

/// Path of the password login screen.
pub const LOGIN_PATH: &str = "/login";

/// Path of the forced password change screen.
pub const CHANGE_PASSWORD_PATH: &str = "/change-password";

/// Safe landing path used when policy denies the requested path.
pub const DEFAULT_LANDING_PATH: &str = "/home";

/// Paths reachable without an authenticated session.
const PUBLIC_PATHS: &[&str] = &["/login", "/device-login", "/invitation/redeem", "/offline"];

/// Registered path prefixes and the roles allowed under each.
///
/// Unknown paths under a registered prefix inherit the prefix rule; paths
/// outside every registered prefix are denied for everyone.
const PATH_RULES: &[(&str, &[StaffRole])] = &[
    (
        "/home",
        &[
            StaffRole::Admin,
            StaffRole::Staff,
            StaffRole::Developer,
            StaffRole::General,
        ],
    ),
    (
        "/board",
        &[
            StaffRole::Admin,
            StaffRole::Staff,
            StaffRole::Developer,
            StaffRole::General,
        ],
    ),
    (
        "/notifications",
        &[
            StaffRole::Admin,
            StaffRole::Staff,
            StaffRole::Developer,
            StaffRole::General,
        ],
    ),
    (
        "/change-password",
        &[
            StaffRole::Admin,
            StaffRole::Staff,
            StaffRole::Developer,
            StaffRole::General,
        ],
    ),
    (
        "/clients",
        &[StaffRole::Admin, StaffRole::Staff, StaffRole::Developer],
    ),
    ("/staff", &[StaffRole::Admin, StaffRole::Developer]),
    ("/organization", &[StaffRole::Admin, StaffRole::Developer]),
    ("/devices", &[StaffRole::Admin, StaffRole::Developer]),
    ("/dev", &[StaffRole::Developer]),
];

/// Returns whether a path is on the fixed public allow-list.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS
        .iter()
        .any(|public| path_matches_prefix(path, public))
}

/// Decides whether a role may access a path.
///
/// Pure and total: every (role, path) pair resolves without side effects.
/// `None` models an unknown or unregistered role claim and denies every
/// non-public path. Public paths are allowed for everyone, including
/// unauthenticated visitors.
#[must_use]
pub fn can_access_path(role: Option<StaffRole>, path: &str) -> bool {
    if is_public_path(path) {
        return true;
    }

    let Some(role) = role else {
        return false;
    };

    PATH_RULES
        .iter()
        .find(|(prefix, _)| path_matches_prefix(path, prefix))
        .is_some_and(|(_, allowed)| allowed.contains(&role))
}

/// Matches `path` against a registered prefix: either exactly, or as a
/// descendant segment (`/staff/42` matches `/staff`, `/staffing` does not).
fn path_matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn admin_can_access_organization_settings() {
        assert!(can_access_path(Some(StaffRole::Admin), "/organization"));
        assert!(can_access_path(
            Some(StaffRole::Admin),
            "/organization/plan"
        ));
    }

    #[test]
    fn staff_cannot_access_organization_settings() {
        assert!(!can_access_path(Some(StaffRole::Staff), "/organization"));
    }

    #[test]
    fn general_cannot_access_client_records() {
        assert!(!can_access_path(Some(StaffRole::General), "/clients/123"));
    }

    #[test]
    fn every_role_can_access_the_landing_path() {
        for role in StaffRole::all() {
            assert!(can_access_path(Some(*role), DEFAULT_LANDING_PATH));
        }
    }

    #[test]
    fn unknown_path_under_registered_prefix_inherits_rule() {
        assert!(can_access_path(
            Some(StaffRole::Developer),
            "/staff/export/csv"
        ));
        assert!(!can_access_path(
            Some(StaffRole::Staff),
            "/staff/export/csv"
        ));
    }

    #[test]
    fn prefix_matching_requires_a_segment_boundary() {
        assert!(!can_access_path(Some(StaffRole::Admin), "/staffing"));
    }

    #[test]
    fn unregistered_path_is_denied_for_every_role() {
        for role in StaffRole::all() {
            assert!(!can_access_path(Some(*role), "/definitely-not-a-screen"));
        }
    }

    #[test]
    fn public_paths_allow_unauthenticated_access() {
        assert!(can_access_path(None, LOGIN_PATH));
        assert!(can_access_path(None, "/device-login"));
        assert!(can_access_path(None, "/invitation/redeem"));
    }

    #[test]
    fn change_password_path_requires_a_role() {
        assert!(!can_access_path(None, CHANGE_PASSWORD_PATH));
        assert!(can_access_path(Some(StaffRole::General), CHANGE_PASSWORD_PATH));
    }

    proptest! {
        #[test]
        fn decision_is_deterministic(path in "/[a-z/]{0,24}") {
            for role in StaffRole::all() {
                let first = can_access_path(Some(*role), &path);
                let second = can_access_path(Some(*role), &path);
                prop_assert_eq!(first, second);
            }
        }

        #[test]
        fn missing_role_only_ever_reaches_public_paths(path in "\\PC{0,32}") {
            prop_assert_eq!(can_access_path(None, &path), is_public_path(&path));
        }

        #[test]
        fn allowed_paths_are_always_registered_or_public(path in "/[a-z/]{0,24}") {
            for role in StaffRole::all() {
                if can_access_path(Some(*role), &path) {
                    let registered = PATH_RULES
                        .iter()
                        .any(|(prefix, _)| path_matches_prefix(&path, prefix));
                    prop_assert!(registered || is_public_path(&path));
                }
            }
        }
    }
}
