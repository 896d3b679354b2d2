use crate::{AppState, errors::ApiError, reputation::ReputationCache};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Answer for a user whose reputation is not cached: the recorded fetch
/// error if there is one, `202 {"loading": true}` while a fetch is pending,
/// otherwise 404.
fn missing(cache: &ReputationCache, user_id: &str) -> Result<Response, ApiError> {
    if let Some(message) = cache.error(user_id) {
        return Err(ApiError::Upstream(message));
    }
    if cache.is_loading(user_id) {
        return Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "loading": true })),
        )
            .into_response());
    }
    Err(ApiError::NotFound)
}

fn found<T: Serialize>(
    cache: &ReputationCache,
    user_id: &str,
    value: Option<T>,
) -> Result<Response, ApiError> {
    match value {
        Some(value) => Ok(Json(value).into_response()),
        None => missing(cache, user_id),
    }
}

/// GET /reputation/{user_id}
pub async fn get_reputation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let reputation = state.reputation.fetch(&user_id).await?;
    found(&state.reputation, &user_id, reputation)
}

/// POST /reputation/{user_id}/refresh
pub async fn refresh_reputation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let reputation = state.reputation.refresh(&user_id).await?;
    found(&state.reputation, &user_id, reputation)
}

/// GET /reputation/{user_id}/breakdown
/// Reads the cache only; fetch the reputation first.
pub async fn get_breakdown(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let breakdown = state.reputation.breakdown(&user_id);
    found(&state.reputation, &user_id, breakdown)
}
