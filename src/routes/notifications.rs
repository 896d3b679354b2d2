use crate::{AppState, notify::Notification};
use axum::{Json, extract::State};

/// GET /notifications
/// Drains pending toasts.
pub async fn drain_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.drain())
}
