use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate reputation of one user as computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reputation {
    pub total_reputation: i64,
    pub profile_popularity: i64,
    pub total_posts_popularity: i64,
    pub total_comments_popularity: i64,
    pub total_posts: u64,
    pub total_comments: u64,
    pub avg_post_popularity: f64,
    pub avg_comment_popularity: f64,
    pub calculated_at: Option<DateTime<Utc>>,
}

impl Reputation {
    /// A record without a timestamp is never fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.calculated_at {
            Some(at) => now.signed_duration_since(at) < ttl,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreParts {
    pub profile: i64,
    pub posts: i64,
    pub comments: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub posts: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Averages {
    pub per_post: f64,
    pub per_comment: f64,
}

/// Display-ready view of a cached [`Reputation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationBreakdown {
    pub total: i64,
    pub scores: ScoreParts,
    pub counts: ActivityCounts,
    pub averages: Averages,
    pub calculated_at: Option<DateTime<Utc>>,
}

impl From<&Reputation> for ReputationBreakdown {
    fn from(rep: &Reputation) -> Self {
        Self {
            total: rep.total_reputation,
            scores: ScoreParts {
                profile: rep.profile_popularity,
                posts: rep.total_posts_popularity,
                comments: rep.total_comments_popularity,
            },
            counts: ActivityCounts {
                posts: rep.total_posts,
                comments: rep.total_comments,
            },
            averages: Averages {
                per_post: average(rep.total_posts_popularity, rep.total_posts),
                per_comment: average(rep.total_comments_popularity, rep.total_comments),
            },
            calculated_at: rep.calculated_at,
        }
    }
}

fn average(total: i64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let avg = total as f64 / count as f64;
    (avg * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_uses_calculated_at() {
        let now = Utc::now();
        let ttl = Duration::minutes(5);
        let mut rep = Reputation {
            calculated_at: Some(now - Duration::minutes(1)),
            ..Default::default()
        };
        assert!(rep.is_fresh(now, ttl));

        rep.calculated_at = Some(now - Duration::minutes(10));
        assert!(!rep.is_fresh(now, ttl));

        rep.calculated_at = None;
        assert!(!rep.is_fresh(now, ttl));
    }

    #[test]
    fn breakdown_computes_rounded_averages() {
        let rep = Reputation {
            total_reputation: 17,
            profile_popularity: 3,
            total_posts_popularity: 10,
            total_comments_popularity: 4,
            total_posts: 3,
            total_comments: 0,
            ..Default::default()
        };
        let breakdown = ReputationBreakdown::from(&rep);
        assert_eq!(breakdown.total, 17);
        assert_eq!(breakdown.scores.posts, 10);
        assert_eq!(breakdown.averages.per_post, 3.33);
        assert_eq!(breakdown.averages.per_comment, 0.0);
    }

    #[test]
    fn parses_backend_payload() {
        let json = r#"{
            "totalReputation": 12,
            "profilePopularity": 2,
            "totalPostsPopularity": 8,
            "totalCommentsPopularity": 2,
            "totalPosts": 4,
            "totalComments": 1,
            "avgPostPopularity": 2,
            "avgCommentPopularity": 2,
            "calculatedAt": "2026-10-19T10:00:00.000Z"
        }"#;
        let rep: Reputation = serde_json::from_str(json).unwrap();
        assert_eq!(rep.total_reputation, 12);
        assert_eq!(rep.avg_post_popularity, 2.0);
        assert!(rep.calculated_at.is_some());
    }
}
