use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use bloomconnect_application::{ProvisionStaffParams, StaffUpdate};
use bloomconnect_core::Identity;
use bloomconnect_domain::{StaffId, StaffRole};
use uuid::Uuid;

use crate::auth::session_helpers::ensure_screen_access;
use crate::dto::{ProvisionStaffRequest, StaffProfileResponse, UpdateStaffRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/staff - List staff profiles in the caller's organization.
pub async fn list_staff_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<StaffProfileResponse>>> {
    ensure_screen_access(&identity, "/staff")?;

    let profiles = state
        .staff_service
        .list(identity.organization_id())
        .await?;

    Ok(Json(
        profiles.into_iter().map(StaffProfileResponse::from).collect(),
    ))
}

/// POST /api/staff - Provision a staff member with a temporary password.
pub async fn provision_staff_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ProvisionStaffRequest>,
) -> ApiResult<Json<StaffProfileResponse>> {
    ensure_screen_access(&identity, "/staff")?;

    let role: StaffRole = payload.role.parse()?;

    let profile = state
        .auth_service
        .provision_staff(ProvisionStaffParams {
            organization_id: identity.organization_id(),
            display_name: payload.display_name,
            role,
            staff_number: payload.staff_number,
            email: payload.email,
            temporary_password: payload.temporary_password,
            acting_subject: identity.subject().to_owned(),
        })
        .await?;

    Ok(Json(StaffProfileResponse::from(profile)))
}

/// GET /api/staff/{staff_id} - Fetch one staff profile.
pub async fn get_staff_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(staff_id): Path<Uuid>,
) -> ApiResult<Json<StaffProfileResponse>> {
    ensure_screen_access(&identity, "/staff")?;

    let profile = state
        .staff_service
        .get(identity.organization_id(), StaffId::from_uuid(staff_id))
        .await?;

    Ok(Json(StaffProfileResponse::from(profile)))
}

/// PUT /api/staff/{staff_id} - Apply a partial staff profile update.
pub async fn update_staff_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(staff_id): Path<Uuid>,
    Json(payload): Json<UpdateStaffRequest>,
) -> ApiResult<Json<StaffProfileResponse>> {
    ensure_screen_access(&identity, "/staff")?;

    let role = payload
        .role
        .map(|role| role.parse::<StaffRole>())
        .transpose()?;

    let profile = state
        .staff_service
        .update(
            identity.organization_id(),
            StaffId::from_uuid(staff_id),
            StaffUpdate {
                display_name: payload.display_name,
                role,
                staff_number: payload.staff_number,
            },
            identity.subject(),
        )
        .await?;

    Ok(Json(StaffProfileResponse::from(profile)))
}

/// DELETE /api/staff/{staff_id} - Retire a staff member and revoke their
/// devices.
pub async fn retire_staff_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(staff_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_screen_access(&identity, "/staff")?;

    state
        .staff_service
        .retire(
            identity.organization_id(),
            StaffId::from_uuid(staff_id),
            identity.subject(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
