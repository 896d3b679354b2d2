use crate::models::{LeaderboardEntry, Reputation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply of the backend toggle endpoints.
///
/// Post toggles carry both fields; profile and comment toggles only carry
/// `popularity`. Fields that are missing or of the wrong type are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleResponse {
    pub popularity: Option<u64>,
    pub popularity_array: Option<Vec<String>>,
}

impl From<&Value> for ToggleResponse {
    fn from(body: &Value) -> Self {
        let popularity = body
            .get("popularity")
            .and_then(Value::as_i64)
            .map(|n| n.max(0) as u64);
        let popularity_array = body
            .get("popularityArray")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            });
        Self {
            popularity,
            popularity_array,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReputationResponse {
    pub reputation: Reputation,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct BatchInitializeResponse {
    pub created: usize,
}
