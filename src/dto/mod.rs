pub mod requests;
pub mod responses;

pub use requests::{BatchInitializeRequest, BatchItem, InitializeRequest, ToggleRequest};
pub use responses::{BatchInitializeResponse, LeaderboardResponse, ReputationResponse, ToggleResponse};
