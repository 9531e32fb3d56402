use axum::Json;
use axum::extract::{Extension, Path, State};
use bloomconnect_core::Identity;
use bloomconnect_domain::RolloutState;

use crate::auth::session_helpers::ensure_screen_access;
use crate::dto::{FeatureEnabledResponse, FeatureFlagResponse, SetFeatureFlagRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/flags - List flag entries for the caller's organization.
pub async fn list_flags_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<FeatureFlagResponse>>> {
    ensure_screen_access(&identity, "/organization")?;

    let flags = state
        .feature_flag_service
        .list(identity.organization_id())
        .await?;

    Ok(Json(flags.into_iter().map(FeatureFlagResponse::from).collect()))
}

/// GET /api/flags/{feature_id} - Effective on/off answer for one feature.
///
/// Any authenticated caller may query; screens ask for their own features
/// before rendering them.
pub async fn feature_enabled_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(feature_id): Path<String>,
) -> ApiResult<Json<FeatureEnabledResponse>> {
    let enabled = state
        .feature_flag_service
        .is_enabled(identity.organization_id(), &feature_id)
        .await?;

    Ok(Json(FeatureEnabledResponse {
        feature_id,
        enabled,
    }))
}

/// PUT /api/flags/{feature_id} - Set a feature's rollout state. Platform
/// scope.
pub async fn set_flag_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(feature_id): Path<String>,
    Json(payload): Json<SetFeatureFlagRequest>,
) -> ApiResult<Json<FeatureFlagResponse>> {
    ensure_screen_access(&identity, "/dev")?;

    let rollout_state: RolloutState = payload.state.parse()?;

    let flag = state
        .feature_flag_service
        .set_flag(
            identity.organization_id(),
            &feature_id,
            rollout_state,
            payload.description,
            identity.subject(),
        )
        .await?;

    Ok(Json(FeatureFlagResponse::from(flag)))
}
