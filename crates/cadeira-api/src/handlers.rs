//! REST API handlers.
//!
//! Each handler issues one store call and maps the outcome to a status
//! code. Failures go through [`ApiError`], which owns the error bodies.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cadeira_store::{Cadeira, CadeiraId};
use tracing::debug;

use crate::ApiState;
use crate::error::ApiError;
use crate::payload::Payload;

pub const LIVENESS_MESSAGE: &str = "API Lista de Compras está no ar!";

/// Path ids that are not integers can never match a row.
fn parse_id(raw: &str) -> Result<CadeiraId, ApiError> {
    raw.parse().map_err(|_| {
        debug!(id = raw, "non-numeric cadeira id");
        ApiError::NotFound
    })
}

// ── Liveness ───────────────────────────────────────────────────

/// GET /
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

// ── Cadeiras ───────────────────────────────────────────────────

/// GET /api/cadeiras
pub async fn list_cadeiras(State(state): State<ApiState>) -> Result<Json<Vec<Cadeira>>, ApiError> {
    let cadeiras = state
        .store
        .list()
        .await
        .map_err(ApiError::internal("listing cadeiras"))?;
    Ok(Json(cadeiras))
}

/// GET /api/cadeiras/:id
pub async fn get_cadeira(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Cadeira>, ApiError> {
    let id = parse_id(&id)?;
    match state
        .store
        .get(id)
        .await
        .map_err(ApiError::internal("fetching cadeira"))?
    {
        Some(cadeira) => Ok(Json(cadeira)),
        None => Err(ApiError::NotFound),
    }
}

/// POST /api/cadeiras
pub async fn create_cadeira(
    State(state): State<ApiState>,
    Payload(payload): Payload,
) -> Result<impl IntoResponse, ApiError> {
    let new = payload.for_create()?;
    let cadeira = state
        .store
        .create(&new)
        .await
        .map_err(ApiError::internal("creating cadeira"))?;
    Ok((StatusCode::CREATED, Json(cadeira)))
}

/// PUT /api/cadeiras/:id
pub async fn update_cadeira(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Payload(payload): Payload,
) -> Result<Json<Cadeira>, ApiError> {
    let new = payload.for_update()?;
    let id = parse_id(&id)?;
    match state
        .store
        .update(id, &new)
        .await
        .map_err(ApiError::internal("updating cadeira"))?
    {
        Some(cadeira) => Ok(Json(cadeira)),
        None => Err(ApiError::NotFound),
    }
}

/// DELETE /api/cadeiras/:id
pub async fn delete_cadeira(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let removed = state
        .store
        .delete(id)
        .await
        .map_err(ApiError::internal("deleting cadeira"))?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
