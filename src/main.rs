// ============================================================================
// SITVERSE GATEWAY - Session-scoped popularity state for the web client
// ============================================================================

// - Optimistic like/unlike for posts, profiles and comments
// - Reconciliation with the SitVerse backend, rollback on failure
// - Reputation cache with a freshness window
// - Leaderboard snapshot
// - Toast queue for failed updates

use sitverse_popularity::{AppState, Config, HttpPopularityApi, routes};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    dotenvy::dotenv().ok();

    if let Err(e) = run().await {
        error!("gateway stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let api = Arc::new(HttpPopularityApi::new(&config)?);
    let state = AppState::new(api, config.reputation_ttl);
    let app = routes::app(state, config.max_concurrency);

    let listener = tokio::net::TcpListener::bind(config.gateway_addr).await?;

    info!("Gateway running on http://{}", config.gateway_addr);
    info!("Backend: {}", config.api_url);
    info!("Endpoints:");
    info!("  GET    /health                           - Health check");
    info!("  POST   /popularity/{{kind}}/init           - Hydrate many records");
    info!("  POST   /popularity/{{kind}}/{{id}}/init      - Hydrate one record");
    info!("  PUT    /popularity/{{kind}}/{{id}}           - Overwrite a record");
    info!("  POST   /popularity/{{kind}}/{{id}}/toggle    - Like / unlike");
    info!("  GET    /popularity/{{kind}}/{{id}}           - Read a record");
    info!("  GET    /reputation/{{user_id}}             - Reputation (cached)");
    info!("  POST   /reputation/{{user_id}}/refresh     - Reputation (refetch)");
    info!("  GET    /reputation/{{user_id}}/breakdown   - Reputation breakdown");
    info!("  GET    /leaderboard                      - Leaderboard snapshot");
    info!("  POST   /leaderboard/refresh              - Refetch leaderboard");
    info!("  GET    /notifications                    - Drain toasts");

    axum::serve(listener, app).await?;
    Ok(())
}
