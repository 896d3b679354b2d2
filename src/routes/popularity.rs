use crate::{
    AppState,
    dto::{BatchInitializeRequest, BatchInitializeResponse, InitializeRequest, ToggleRequest},
    errors::ApiError,
    models::{ContentKind, PopularityRecord},
    popularity::ToggleOutcome,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;
use validator::Validate;

/// POST /popularity/{kind}/{id}/init
/// Body: { "likers": ["..."], "user_id": "..." }
pub async fn initialize(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, String)>,
    Json(payload): Json<InitializeRequest>,
) -> Result<(StatusCode, Json<PopularityRecord>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let created = state
        .popularity
        .initialize(kind, &id, payload.likers, &payload.user_id)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(state.popularity.get_record(kind, &id))))
}

/// POST /popularity/{kind}/init
/// Body: { "items": [{ "id": "...", "likers": ["..."] }], "user_id": "..." }
pub async fn initialize_batch(
    State(state): State<AppState>,
    Path(kind): Path<ContentKind>,
    Json(payload): Json<BatchInitializeRequest>,
) -> Result<Json<BatchInitializeResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let items = payload.items.into_iter().map(|item| (item.id, item.likers));
    let created = state
        .popularity
        .initialize_batch(kind, items, &payload.user_id)?;

    Ok(Json(BatchInitializeResponse { created }))
}

/// PUT /popularity/{kind}/{id}
/// Body: { "likers": ["..."], "user_id": "..." }
pub async fn force_update(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, String)>,
    Json(payload): Json<InitializeRequest>,
) -> Result<Json<PopularityRecord>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let record = state
        .popularity
        .force_update(kind, &id, payload.likers, &payload.user_id)?;

    Ok(Json(record))
}

/// POST /popularity/{kind}/{id}/toggle
/// Body: { "user_id": "..." }
pub async fn toggle(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, String)>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleOutcome>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let outcome = state
        .popularity
        .toggle(kind, &id, &payload.user_id)
        .await?;
    debug!(%kind, id = %id, ?outcome, "toggle handled");

    Ok(Json(outcome))
}

/// GET /popularity/{kind}/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, String)>,
) -> Json<PopularityRecord> {
    Json(state.popularity.get_record(kind, &id))
}
