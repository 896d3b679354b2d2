//! Client-side popularity, reputation and leaderboard state for SitVerse.
//!
//! The caches sit between a view layer and the SitVerse REST backend. Likes
//! are applied optimistically and reconciled with the backend's answer;
//! reputation is served from cache while fresh; the leaderboard is replaced
//! wholesale on every fetch.

pub mod client;
pub mod config;
pub mod dto;
pub mod errors;
pub mod leaderboard;
pub mod models;
pub mod notify;
pub mod popularity;
pub mod reputation;
pub mod routes;
pub mod states;

#[cfg(test)]
pub(crate) mod test_utils;

pub use client::{HttpPopularityApi, PopularityApi};
pub use config::Config;
pub use errors::ApiError;
pub use popularity::{PopularityStore, SkipReason, ToggleOutcome};
pub use states::AppState;
