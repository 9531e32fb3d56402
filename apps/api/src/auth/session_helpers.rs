use axum::http::HeaderMap;
use bloomconnect_core::{AppError, Identity};
use bloomconnect_domain::{StaffId, StaffRole, can_access_path};
use tower_sessions::Session;
use uuid::Uuid;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

/// Cycles the session id and stores the identity plus creation time.
///
/// OWASP session management: the id is regenerated on every privilege
/// change so a pre-login session id never survives authentication.
pub(super) async fn establish_session(
    session: &Session,
    identity: &Identity,
) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    Ok(())
}

/// Parses the session subject back into a staff id.
pub(crate) fn staff_id_from_identity(identity: &Identity) -> Result<StaffId, AppError> {
    let staff_uuid = Uuid::parse_str(identity.subject())
        .map_err(|error| AppError::Internal(format!("invalid session subject: {error}")))?;

    Ok(StaffId::from_uuid(staff_uuid))
}

/// Parses the role claim. Unknown claims resolve to `None` and deny.
pub(crate) fn role_of(identity: &Identity) -> Option<StaffRole> {
    identity.role().parse().ok()
}

/// Rejects callers whose role may not open the given screen path.
pub(crate) fn ensure_screen_access(identity: &Identity, path: &str) -> Result<(), AppError> {
    if can_access_path(role_of(identity), path) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "your role does not grant access to this resource".to_owned(),
        ))
    }
}

pub(crate) fn extract_request_context(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    (ip_address, user_agent)
}
