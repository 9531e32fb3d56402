use axum::Json;
use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::http::StatusCode;
use bloomconnect_application::{AuthOutcome, post_login_path};
use bloomconnect_core::{AppError, Identity};
use bloomconnect_domain::CHANGE_PASSWORD_PATH;
use tower_sessions::Session;

use crate::dto::{ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;
use super::session_helpers::{establish_session, extract_request_context, staff_id_from_identity};

/// POST /auth/login - Authenticate with organization code, email and password.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (ip_address, user_agent) = extract_request_context(&headers);

    let outcome = state
        .auth_service
        .login(
            &payload.organization_code,
            &payload.email,
            &payload.password,
            ip_address,
            user_agent,
        )
        .await?;

    match outcome {
        AuthOutcome::Authenticated { identity, .. } => {
            establish_session(&session, &identity).await?;

            // A pending password change overrides any requested return path.
            let redirect_to = if identity.must_change_password() {
                CHANGE_PASSWORD_PATH.to_owned()
            } else {
                post_login_path(payload.return_to.as_deref())
            };

            Ok(Json(LoginResponse {
                status: "authenticated".to_owned(),
                redirect_to,
            }))
        }
        AuthOutcome::Failed => {
            // Generic message for all failure cases to prevent enumeration.
            Err(AppError::Unauthorized(
                "invalid organization code, email or password".to_owned(),
            )
            .into())
        }
    }
}

/// PUT /api/profile/password - Change password (requires auth).
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    let staff_id = staff_id_from_identity(&identity)?;

    let refreshed = state
        .auth_service
        .change_password(staff_id, &payload.current_password, &payload.new_password)
        .await?;

    // The stored identity carries the pending-change claim; replace it so the
    // route guard stops redirecting.
    session
        .insert(SESSION_USER_KEY, &refreshed)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    Ok(StatusCode::NO_CONTENT)
}
