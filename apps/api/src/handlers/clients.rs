use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use bloomconnect_application::{ClientInput, ClientUpdate};
use bloomconnect_core::Identity;
use bloomconnect_domain::ClientId;
use uuid::Uuid;

use crate::auth::session_helpers::ensure_screen_access;
use crate::dto::{ClientResponse, CreateClientRequest, UpdateClientRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/clients - List active clients in the caller's organization.
pub async fn list_clients_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<ClientResponse>>> {
    ensure_screen_access(&identity, "/clients")?;

    let clients = state
        .client_service
        .list(identity.organization_id())
        .await?;

    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

/// POST /api/clients - Create a client record.
pub async fn create_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateClientRequest>,
) -> ApiResult<Json<ClientResponse>> {
    ensure_screen_access(&identity, "/clients")?;

    let client = state
        .client_service
        .create(
            identity.organization_id(),
            ClientInput {
                display_name: payload.display_name,
                phonetic_name: payload.phonetic_name,
                birth_date: payload.birth_date,
                care_notes: payload.care_notes,
            },
            identity.subject(),
        )
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

/// GET /api/clients/{client_id} - Fetch one client record.
pub async fn get_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<Json<ClientResponse>> {
    ensure_screen_access(&identity, "/clients")?;

    let client = state
        .client_service
        .get(identity.organization_id(), ClientId::from_uuid(client_id))
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

/// PUT /api/clients/{client_id} - Apply a partial client update.
pub async fn update_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientResponse>> {
    ensure_screen_access(&identity, "/clients")?;

    let client = state
        .client_service
        .update(
            identity.organization_id(),
            ClientId::from_uuid(client_id),
            ClientUpdate {
                display_name: payload.display_name,
                phonetic_name: payload.phonetic_name,
                birth_date: payload.birth_date,
                care_notes: payload.care_notes,
            },
            identity.subject(),
        )
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

/// DELETE /api/clients/{client_id} - Soft-delete a client record.
pub async fn delete_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ensure_screen_access(&identity, "/clients")?;

    state
        .client_service
        .delete(
            identity.organization_id(),
            ClientId::from_uuid(client_id),
            identity.subject(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
