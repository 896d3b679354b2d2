pub mod leaderboard;
pub mod popularity;
pub mod reputation;

pub use leaderboard::{LeaderboardEntry, LeaderboardSnapshot};
pub use popularity::{ContentKind, PopularityRecord};
pub use reputation::{Reputation, ReputationBreakdown};
