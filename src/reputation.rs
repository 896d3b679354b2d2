use crate::{
    client::PopularityApi,
    errors::ApiError,
    models::{Reputation, ReputationBreakdown},
};
use chrono::{Duration, Utc};
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use tracing::{debug, error};

/// Clears a user's pending flag when the fetch settles.
struct PendingFetch<'a> {
    pending: &'a DashSet<String>,
    user_id: String,
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.user_id);
    }
}

/// Per-user reputation, served from cache while the backend's
/// `calculatedAt` is younger than the freshness window.
pub struct ReputationCache {
    records: DashMap<String, Reputation>,
    errors: DashMap<String, String>,
    pending: DashSet<String>,
    api: Arc<dyn PopularityApi>,
    ttl: Duration,
}

impl ReputationCache {
    pub fn new(api: Arc<dyn PopularityApi>, ttl: std::time::Duration) -> Self {
        Self {
            records: DashMap::new(),
            errors: DashMap::new(),
            pending: DashSet::new(),
            api,
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
        }
    }

    /// Cached reputation if fresh, otherwise fetched from the backend.
    ///
    /// While a fetch for the same user is outstanding the cached value (which
    /// may be stale or absent) is returned instead of a second request.
    /// Backend failures are logged and yield `None`.
    pub async fn fetch(&self, user_id: &str) -> Result<Option<Reputation>, ApiError> {
        ApiError::require_id("userId", user_id)?;

        let cached = self.get(user_id);
        if let Some(rep) = &cached {
            if rep.is_fresh(Utc::now(), self.ttl) {
                debug!(user_id, "reputation served from cache");
                return Ok(cached);
            }
        }

        if !self.pending.insert(user_id.to_string()) {
            debug!(user_id, "reputation fetch already pending");
            return Ok(cached);
        }
        let _guard = PendingFetch {
            pending: &self.pending,
            user_id: user_id.to_string(),
        };

        match self.api.reputation(user_id).await {
            Ok(rep) => {
                self.records.insert(user_id.to_string(), rep.clone());
                self.errors.remove(user_id);
                Ok(Some(rep))
            }
            Err(e) => {
                error!(user_id, "failed to fetch reputation: {}", e);
                self.errors.insert(user_id.to_string(), e.to_string());
                Ok(None)
            }
        }
    }

    /// Drop the cached record and fetch again, ignoring the freshness window.
    pub async fn refresh(&self, user_id: &str) -> Result<Option<Reputation>, ApiError> {
        ApiError::require_id("userId", user_id)?;
        self.records.remove(user_id);
        self.fetch(user_id).await
    }

    pub fn breakdown(&self, user_id: &str) -> Option<ReputationBreakdown> {
        self.records
            .get(user_id)
            .map(|rep| ReputationBreakdown::from(rep.value()))
    }

    pub fn get(&self, user_id: &str) -> Option<Reputation> {
        self.records.get(user_id).map(|rep| rep.value().clone())
    }

    pub fn error(&self, user_id: &str) -> Option<String> {
        self.errors.get(user_id).map(|e| e.value().clone())
    }

    pub fn is_loading(&self, user_id: &str) -> bool {
        self.pending.contains(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockApi;

    fn cache() -> (ReputationCache, Arc<MockApi>) {
        let api = Arc::new(MockApi::new());
        let cache = ReputationCache::new(api.clone(), std::time::Duration::from_secs(300));
        (cache, api)
    }

    fn calculated(minutes_ago: i64, total: i64) -> Reputation {
        Reputation {
            total_reputation: total,
            total_posts: 2,
            total_posts_popularity: 5,
            calculated_at: Some(Utc::now() - Duration::minutes(minutes_ago)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fresh_record_skips_the_backend() {
        let (cache, api) = cache();
        api.push_reputation(Ok(calculated(1, 10)));

        assert_eq!(cache.fetch("u1").await.unwrap().unwrap().total_reputation, 10);
        assert_eq!(cache.fetch("u1").await.unwrap().unwrap().total_reputation, 10);
        assert_eq!(api.reputation_calls(), 1);
    }

    #[tokio::test]
    async fn stale_record_is_refetched() {
        let (cache, api) = cache();
        api.push_reputation(Ok(calculated(10, 10)));
        api.push_reputation(Ok(calculated(0, 12)));

        cache.fetch("u1").await.unwrap();
        let rep = cache.fetch("u1").await.unwrap().unwrap();
        assert_eq!(rep.total_reputation, 12);
        assert_eq!(api.reputation_calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_fetch_returns_cached_value() {
        let (cache, api) = cache();
        let release = api.gate_reputation();

        let first = cache.fetch("u1");
        let second = async {
            assert!(cache.is_loading("u1"));
            let seen = cache.fetch("u1").await.unwrap();
            release.send(Ok(calculated(0, 7))).unwrap();
            seen
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(second, None);
        assert_eq!(first.unwrap().unwrap().total_reputation, 7);
        assert_eq!(api.reputation_calls(), 1);
        assert!(!cache.is_loading("u1"));
    }

    #[tokio::test]
    async fn failure_is_logged_and_suppressed() {
        let (cache, api) = cache();
        api.push_reputation(Err(ApiError::Network("offline".into())));

        assert_eq!(cache.fetch("u1").await.unwrap(), None);
        assert!(cache.error("u1").unwrap().contains("offline"));
        assert!(cache.breakdown("u1").is_none());
    }

    #[tokio::test]
    async fn refresh_bypasses_freshness() {
        let (cache, api) = cache();
        api.push_reputation(Ok(calculated(0, 3)));
        api.push_reputation(Ok(calculated(0, 4)));

        cache.fetch("u1").await.unwrap();
        let rep = cache.refresh("u1").await.unwrap().unwrap();
        assert_eq!(rep.total_reputation, 4);
        assert_eq!(api.reputation_calls(), 2);
    }

    #[tokio::test]
    async fn breakdown_reflects_cached_record() {
        let (cache, api) = cache();
        assert!(cache.breakdown("u1").is_none());
        api.push_reputation(Ok(calculated(0, 9)));
        cache.fetch("u1").await.unwrap();

        let breakdown = cache.breakdown("u1").unwrap();
        assert_eq!(breakdown.total, 9);
        assert_eq!(breakdown.counts.posts, 2);
        assert_eq!(breakdown.averages.per_post, 2.5);
    }

    #[tokio::test]
    async fn empty_user_id_is_a_validation_error() {
        let (cache, api) = cache();
        let err = cache.fetch("").await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(api.reputation_calls(), 0);
    }
}
