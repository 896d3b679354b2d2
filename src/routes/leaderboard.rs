use crate::{AppState, models::LeaderboardSnapshot};
use axum::{Json, extract::State};

/// GET /leaderboard
pub async fn get_leaderboard(State(state): State<AppState>) -> Json<LeaderboardSnapshot> {
    Json(state.leaderboard.snapshot().await)
}

/// POST /leaderboard/refresh
pub async fn refresh_leaderboard(State(state): State<AppState>) -> Json<LeaderboardSnapshot> {
    Json(state.leaderboard.fetch().await)
}
