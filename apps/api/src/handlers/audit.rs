use axum::Json;
use axum::extract::{Extension, Query, State};
use bloomconnect_application::AuditLogQuery;
use bloomconnect_core::Identity;
use serde::Deserialize;

use crate::auth::session_helpers::ensure_screen_access;
use crate::dto::AuditLogEntryResponse;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub subject: Option<String>,
}

/// GET /api/audit-log - List recent audit entries for the caller's
/// organization.
pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<AuditLogParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    ensure_screen_access(&identity, "/organization")?;

    let entries = state
        .audit_service
        .list_recent_entries(
            identity.organization_id(),
            AuditLogQuery {
                limit: params.limit.unwrap_or(50),
                offset: params.offset.unwrap_or(0),
                action: params.action,
                subject: params.subject,
            },
        )
        .await?;

    Ok(Json(
        entries.into_iter().map(AuditLogEntryResponse::from).collect(),
    ))
}
