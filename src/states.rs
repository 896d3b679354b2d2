use crate::{
    client::PopularityApi, leaderboard::LeaderboardStore, notify::NotificationQueue,
    popularity::PopularityStore, reputation::ReputationCache,
};
use std::{sync::Arc, time::Duration};

const NOTIFICATION_CAPACITY: usize = 64;

// ============================================================================
// APPLICATION STATE - The session's caches, owned here and nowhere else
// ============================================================================
/// Handlers reach the caches only through `State<AppState>`; every clone
/// shares the same stores.
#[derive(Clone)]
pub struct AppState {
    pub popularity: Arc<PopularityStore>,
    pub reputation: Arc<ReputationCache>,
    pub leaderboard: Arc<LeaderboardStore>,
    pub notifications: NotificationQueue,
}

impl AppState {
    pub fn new(api: Arc<dyn PopularityApi>, reputation_ttl: Duration) -> Self {
        let notifications = NotificationQueue::new(NOTIFICATION_CAPACITY);
        Self {
            popularity: Arc::new(PopularityStore::new(
                api.clone(),
                Arc::new(notifications.clone()),
            )),
            reputation: Arc::new(ReputationCache::new(api.clone(), reputation_ttl)),
            leaderboard: Arc::new(LeaderboardStore::new(api)),
            notifications,
        }
    }
}
