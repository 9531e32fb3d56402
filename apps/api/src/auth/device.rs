use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use bloomconnect_application::{AuthOutcome, DeviceRegistration, post_login_path};
use bloomconnect_core::AppError;
use tower_sessions::Session;

use crate::dto::{
    DeviceLoginRequest, InvitationValidationResponse, LoginResponse, RedeemInvitationRequest,
    TrustedDeviceResponse, ValidateInvitationRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session_helpers::{establish_session, extract_request_context};

/// POST /auth/device-login - Expedited login through a registered device.
pub async fn device_login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<DeviceLoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (ip_address, user_agent) = extract_request_context(&headers);

    let outcome = state
        .auth_service
        .device_login(
            &payload.fingerprint,
            payload.pin.as_deref(),
            payload.biometric_credential_id.as_deref(),
            ip_address,
            user_agent,
        )
        .await?;

    match outcome {
        AuthOutcome::Authenticated { identity, .. } => {
            establish_session(&session, &identity).await?;

            Ok(Json(LoginResponse {
                status: "authenticated".to_owned(),
                redirect_to: post_login_path(None),
            }))
        }
        AuthOutcome::Failed => Err(AppError::Unauthorized(
            "device login failed, please sign in with your password".to_owned(),
        )
        .into()),
    }
}

/// POST /auth/invitations/validate - Check an invitation code without
/// redeeming it.
pub async fn validate_invitation_handler(
    State(state): State<AppState>,
    Json(payload): Json<ValidateInvitationRequest>,
) -> ApiResult<Json<InvitationValidationResponse>> {
    let validation = state
        .device_invitation_service
        .validate_code(&payload.code)
        .await?;

    Ok(Json(InvitationValidationResponse::from(validation)))
}

/// POST /auth/invitations/redeem - Redeem an invitation and register the
/// device as trusted.
pub async fn redeem_invitation_handler(
    State(state): State<AppState>,
    Json(payload): Json<RedeemInvitationRequest>,
) -> ApiResult<Json<TrustedDeviceResponse>> {
    let device = state
        .device_invitation_service
        .redeem_invitation(DeviceRegistration {
            code: payload.code,
            fingerprint: payload.fingerprint,
            pin: payload.pin,
            biometric_credential_id: payload.biometric_credential_id,
        })
        .await?;

    Ok(Json(TrustedDeviceResponse::from(device)))
}
