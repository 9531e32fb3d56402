use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use bloomconnect_application::PublishNotificationParams;
use bloomconnect_core::{AppError, Identity};
use bloomconnect_domain::{NotificationId, StaffRole};
use uuid::Uuid;

use crate::auth::session_helpers::{role_of, staff_id_from_identity};
use crate::dto::{NotificationResponse, PublishNotificationRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// Publishing and deleting announcements is an administrative action.
fn ensure_can_manage(identity: &Identity) -> Result<(), AppError> {
    match role_of(identity) {
        Some(StaffRole::Admin | StaffRole::Developer) => Ok(()),
        _ => Err(AppError::Forbidden(
            "only administrators can manage notifications".to_owned(),
        )),
    }
}

/// GET /api/notifications - List notifications visible to the caller's role.
pub async fn list_notifications_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let role = role_of(&identity).ok_or_else(|| {
        AppError::Forbidden("your role does not grant access to this resource".to_owned())
    })?;

    let notifications = state
        .notification_service
        .list_visible(identity.organization_id(), role)
        .await?;

    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// POST /api/notifications - Publish a notification.
pub async fn publish_notification_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<PublishNotificationRequest>,
) -> ApiResult<Json<NotificationResponse>> {
    ensure_can_manage(&identity)?;

    let target_role = payload
        .target_role
        .map(|role| role.parse::<StaffRole>())
        .transpose()?;

    let notification = state
        .notification_service
        .publish(PublishNotificationParams {
            organization_id: identity.organization_id(),
            title: payload.title,
            body: payload.body,
            target_role,
            created_by: staff_id_from_identity(&identity)?,
        })
        .await?;

    Ok(Json(NotificationResponse::from(notification)))
}

/// DELETE /api/notifications/{notification_id} - Remove a notification.
pub async fn delete_notification_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_can_manage(&identity)?;

    state
        .notification_service
        .delete(
            identity.organization_id(),
            NotificationId::from_uuid(notification_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
