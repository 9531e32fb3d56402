use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use bloomconnect_core::{AppError, Identity};
use bloomconnect_domain::{StaffId, TrustedDeviceId};
use uuid::Uuid;

use crate::auth::session_helpers::ensure_screen_access;
use crate::dto::{CreateInvitationRequest, InvitationResponse, TrustedDeviceResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/devices/invitations - Issue a device invitation for a staff
/// member.
pub async fn create_invitation_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateInvitationRequest>,
) -> ApiResult<Json<InvitationResponse>> {
    ensure_screen_access(&identity, "/devices")?;

    let staff_uuid = Uuid::parse_str(&payload.staff_id)
        .map_err(|error| AppError::Validation(format!("invalid staff id: {error}")))?;

    let invitation = state
        .device_invitation_service
        .create_invitation(
            identity.organization_id(),
            StaffId::from_uuid(staff_uuid),
            identity.subject(),
        )
        .await?;

    Ok(Json(InvitationResponse::from(invitation)))
}

/// GET /api/devices/invitations - List invitations issued by the caller's
/// organization.
pub async fn list_invitations_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<InvitationResponse>>> {
    ensure_screen_access(&identity, "/devices")?;

    let invitations = state
        .device_invitation_service
        .list_invitations(identity.organization_id())
        .await?;

    Ok(Json(
        invitations.into_iter().map(InvitationResponse::from).collect(),
    ))
}

/// GET /api/devices - List trusted devices across the caller's organization.
pub async fn list_devices_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<TrustedDeviceResponse>>> {
    ensure_screen_access(&identity, "/devices")?;

    let devices = state
        .device_invitation_service
        .list_devices(identity.organization_id())
        .await?;

    Ok(Json(
        devices.into_iter().map(TrustedDeviceResponse::from).collect(),
    ))
}

/// DELETE /api/devices/{device_id} - Revoke a trusted device.
pub async fn revoke_device_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(device_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_screen_access(&identity, "/devices")?;

    state
        .device_invitation_service
        .revoke_device(
            identity.organization_id(),
            TrustedDeviceId::from_uuid(device_id),
            identity.subject(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
