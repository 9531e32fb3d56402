use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::StatusCode;
use bloomconnect_application::{AuthEvent, RouteDecision, SessionService, decide_route};
use bloomconnect_core::{AppError, Identity};
use bloomconnect_domain::{CHANGE_PASSWORD_PATH, DEFAULT_LANDING_PATH, LOGIN_PATH};
use serde::Deserialize;
use tower_sessions::Session;

use crate::dto::{IdentityResponse, RouteDecisionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;
use super::session_helpers::extract_request_context;

pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<StatusCode> {
    let subject = session
        .get::<Identity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    let (ip_address, user_agent) = extract_request_context(&headers);
    state
        .auth_event_service
        .record_event(AuthEvent {
            subject,
            event_type: "logout".to_owned(),
            outcome: "success".to_owned(),
            ip_address,
            user_agent,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(session: Session) -> ApiResult<Json<IdentityResponse>> {
    let identity = session
        .get::<Identity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    Ok(Json(IdentityResponse::from(identity)))
}

#[derive(Debug, Deserialize)]
pub struct RouteDecisionQuery {
    pub path: String,
}

/// GET /auth/route-decision - Resolve the session and decide what the screen
/// layer should do with the requested path.
///
/// The observer is created per request so concurrent sessions never share a
/// snapshot; the identity transition resolves against live profile and
/// organization state rather than trusting session claims.
pub async fn route_decision_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RouteDecisionQuery>,
) -> ApiResult<Json<RouteDecisionResponse>> {
    let identity = session
        .get::<Identity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    let observer = SessionService::new(
        state.staff_repository.clone(),
        state.organization_repository.clone(),
    );
    observer.on_identity_changed(identity).await;
    let snapshot = observer.snapshot();

    let response = match decide_route(&snapshot, &query.path) {
        RouteDecision::RenderLoading => RouteDecisionResponse {
            decision: "loading".to_owned(),
            redirect_to: None,
        },
        RouteDecision::Render => RouteDecisionResponse {
            decision: "render".to_owned(),
            redirect_to: None,
        },
        RouteDecision::RedirectToLogin { return_to } => RouteDecisionResponse {
            decision: "redirect".to_owned(),
            redirect_to: Some(format!("{LOGIN_PATH}?return_to={return_to}")),
        },
        RouteDecision::RedirectToChangePassword => RouteDecisionResponse {
            decision: "redirect".to_owned(),
            redirect_to: Some(CHANGE_PASSWORD_PATH.to_owned()),
        },
        RouteDecision::RedirectToDefault => RouteDecisionResponse {
            decision: "redirect".to_owned(),
            redirect_to: Some(DEFAULT_LANDING_PATH.to_owned()),
        },
    };

    Ok(Json(response))
}
