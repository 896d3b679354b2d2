pub mod health;
pub mod leaderboard;
pub mod notifications;
pub mod popularity;
pub mod reputation;

use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the gateway router around the session's caches.
pub fn app(state: AppState, max_concurrency: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        // Popularity cache
        .route("/popularity/{kind}/init", post(popularity::initialize_batch))
        .route(
            "/popularity/{kind}/{id}",
            get(popularity::get_record).put(popularity::force_update),
        )
        .route("/popularity/{kind}/{id}/init", post(popularity::initialize))
        .route("/popularity/{kind}/{id}/toggle", post(popularity::toggle))
        // Reputation
        .route("/reputation/{user_id}", get(reputation::get_reputation))
        .route(
            "/reputation/{user_id}/refresh",
            post(reputation::refresh_reputation),
        )
        .route(
            "/reputation/{user_id}/breakdown",
            get(reputation::get_breakdown),
        )
        // Leaderboard
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/leaderboard/refresh", post(leaderboard::refresh_leaderboard))
        .route("/notifications", get(notifications::drain_notifications))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(max_concurrency))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
