//! Route guard deciding what a screen request does with the current session.
//!
//! A pure function over the session snapshot and the requested path, so the
//! decision table is directly testable without any I/O.

use bloomconnect_domain::{
    CHANGE_PASSWORD_PATH, DEFAULT_LANDING_PATH, LOGIN_PATH, can_access_path, is_public_path,
};

use crate::SessionSnapshot;

/// What the screen layer should do for a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session is still resolving; render the loading state, never a guess.
    RenderLoading,
    /// Not authenticated on a protected path; go to login and come back.
    RedirectToLogin {
        /// Path to return to after login.
        return_to: String,
    },
    /// A password change is pending and blocks everything else.
    RedirectToChangePassword,
    /// Path exists but the role may not see it; go to the landing screen.
    RedirectToDefault,
    /// Render the requested path.
    Render,
}

/// Decides the route for a session snapshot and path.
///
/// Order is fixed: loading wins over everything, then authentication, then
/// the pending password change, then the role policy.
#[must_use]
pub fn decide_route(snapshot: &SessionSnapshot, path: &str) -> RouteDecision {
    if snapshot.is_loading {
        return RouteDecision::RenderLoading;
    }

    if !snapshot.is_authenticated() {
        if is_public_path(path) {
            return RouteDecision::Render;
        }
        return RouteDecision::RedirectToLogin {
            return_to: path.to_owned(),
        };
    }

    if snapshot.must_change_password() && path != CHANGE_PASSWORD_PATH && path != LOGIN_PATH {
        return RouteDecision::RedirectToChangePassword;
    }

    // Authenticated users have no business on the login screen.
    if path == LOGIN_PATH {
        return RouteDecision::RedirectToDefault;
    }

    if can_access_path(snapshot.role(), path) {
        RouteDecision::Render
    } else {
        RouteDecision::RedirectToDefault
    }
}

/// Returns the landing path for a successful login.
#[must_use]
pub fn post_login_path(return_to: Option<&str>) -> String {
    match return_to {
        Some(path) if !is_public_path(path) && path.starts_with('/') => path.to_owned(),
        _ => DEFAULT_LANDING_PATH.to_owned(),
    }
}
