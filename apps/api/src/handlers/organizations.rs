use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use bloomconnect_application::OnboardOrganizationParams;
use bloomconnect_core::{Identity, OrganizationId};
use bloomconnect_domain::PlanTier;
use uuid::Uuid;

use crate::auth::session_helpers::ensure_screen_access;
use crate::dto::{
    ChangePlanRequest, OnboardOrganizationRequest, OrganizationResponse,
    UpdateContractedAppsRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/organizations/current - Fetch the caller's organization.
pub async fn current_organization_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<OrganizationResponse>> {
    ensure_screen_access(&identity, "/organization")?;

    let organization = state
        .organization_service
        .get(identity.organization_id())
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

/// PUT /api/organizations/current/apps - Replace the caller's contracted
/// app list.
pub async fn update_contracted_apps_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateContractedAppsRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    ensure_screen_access(&identity, "/organization")?;

    let organization = state
        .organization_service
        .update_contracted_apps(
            identity.organization_id(),
            payload.contracted_apps,
            identity.subject(),
        )
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

/// GET /api/organizations - List every organization. Platform scope.
pub async fn list_organizations_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<OrganizationResponse>>> {
    ensure_screen_access(&identity, "/dev")?;

    let organizations = state.organization_service.list_all().await?;

    Ok(Json(
        organizations
            .into_iter()
            .map(OrganizationResponse::from)
            .collect(),
    ))
}

/// POST /api/organizations - Onboard a new organization. Platform scope.
pub async fn onboard_organization_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<OnboardOrganizationRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    ensure_screen_access(&identity, "/dev")?;

    let plan_tier: PlanTier = payload.plan_tier.parse()?;

    let organization = state
        .organization_service
        .onboard(OnboardOrganizationParams {
            name: payload.name,
            code: payload.code,
            plan_tier,
            contracted_apps: payload.contracted_apps,
            acting_subject: identity.subject().to_owned(),
        })
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

/// PUT /api/organizations/{organization_id}/plan - Change an organization's
/// plan. Platform scope.
pub async fn change_plan_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(organization_id): Path<Uuid>,
    Json(payload): Json<ChangePlanRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    ensure_screen_access(&identity, "/dev")?;

    let plan_tier: PlanTier = payload.plan_tier.parse()?;

    let organization = state
        .organization_service
        .change_plan(
            OrganizationId::from_uuid(organization_id),
            plan_tier,
            payload.staff_limit_override,
            identity.subject(),
        )
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

/// DELETE /api/organizations/{organization_id} - Deactivate an organization.
/// Platform scope.
pub async fn deactivate_organization_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(organization_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_screen_access(&identity, "/dev")?;

    state
        .organization_service
        .deactivate(OrganizationId::from_uuid(organization_id), identity.subject())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
