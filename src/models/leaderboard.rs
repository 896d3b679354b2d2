use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawLeaderboardEntry")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub full_name: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub total_reputation: i64,
    pub total_posts: Option<u64>,
    pub total_comments: Option<u64>,
}

/// Wire shape of a leaderboard row. Aggregated rows may carry the id as
/// `userId`, `_id`, or both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLeaderboardEntry {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default, rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    profile_picture: Option<String>,
    #[serde(default)]
    total_reputation: i64,
    #[serde(default)]
    total_posts: Option<u64>,
    #[serde(default)]
    total_comments: Option<u64>,
}

impl TryFrom<RawLeaderboardEntry> for LeaderboardEntry {
    type Error = String;

    fn try_from(raw: RawLeaderboardEntry) -> Result<Self, Self::Error> {
        let user_id = raw
            .user_id
            .or(raw.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "leaderboard entry has no userId or _id".to_string())?;
        Ok(Self {
            user_id,
            full_name: raw.full_name,
            username: raw.username,
            profile_picture: raw.profile_picture,
            total_reputation: raw.total_reputation,
            total_posts: raw.total_posts,
            total_comments: raw.total_comments,
        })
    }
}

/// Ranked users, rank implied by position. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSnapshot {
    pub entries: Vec<LeaderboardEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

impl LeaderboardSnapshot {
    /// Entries paired with their 1-based rank.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &LeaderboardEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_either_id_field() {
        let a: LeaderboardEntry =
            serde_json::from_str(r#"{"userId":"u1","fullName":"A","username":"a","totalReputation":5}"#)
                .unwrap();
        let b: LeaderboardEntry =
            serde_json::from_str(r#"{"_id":"u2","fullName":"B","username":"b","totalReputation":3}"#)
                .unwrap();
        assert_eq!(a.user_id, "u1");
        assert_eq!(b.user_id, "u2");
        assert_eq!(b.profile_picture, None);
    }

    #[test]
    fn aggregated_rows_may_carry_both_ids() {
        let entry: LeaderboardEntry = serde_json::from_str(
            r#"{"_id":"u1","userId":"u1","fullName":"A","username":"a","totalReputation":5}"#,
        )
        .unwrap();
        assert_eq!(entry.user_id, "u1");

        let rows: Vec<LeaderboardEntry> = serde_json::from_str(
            r#"[{"_id":"x","userId":"u2"},{"userId":"u3","_id":"y"}]"#,
        )
        .unwrap();
        let ids: Vec<_> = rows.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, ["u2", "u3"]);
    }

    #[test]
    fn rows_without_an_id_are_rejected() {
        let err = serde_json::from_str::<LeaderboardEntry>(r#"{"fullName":"A"}"#).unwrap_err();
        assert!(err.to_string().contains("no userId or _id"));
    }
}
