//! Scripted backend for unit tests.

use crate::{
    client::PopularityApi,
    dto::ToggleResponse,
    errors::ApiError,
    models::{ContentKind, LeaderboardEntry, Reputation},
};
use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::oneshot;

type Reply<T> = oneshot::Receiver<Result<T, ApiError>>;

/// Replies are consumed in order. A gated reply stays unresolved until the
/// test sends on the returned sender, which keeps the call in flight.
pub struct MockApi {
    toggles: Mutex<VecDeque<Reply<ToggleResponse>>>,
    reputations: Mutex<VecDeque<Reply<Reputation>>>,
    leaderboards: Mutex<VecDeque<Reply<Vec<LeaderboardEntry>>>>,
    toggle_calls: Mutex<Vec<(ContentKind, String)>>,
    reputation_calls: AtomicUsize,
    leaderboard_calls: AtomicUsize,
}

fn ready<T>(value: Result<T, ApiError>) -> Reply<T> {
    let (tx, rx) = oneshot::channel();
    let _ = tx.send(value);
    rx
}

async fn next<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> Result<T, ApiError> {
    let reply = queue.lock().unwrap().pop_front();
    match reply {
        Some(rx) => rx
            .await
            .unwrap_or_else(|_| Err(ApiError::Network("reply dropped".into()))),
        None => Err(ApiError::Network("no scripted reply".into())),
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            toggles: Mutex::new(VecDeque::new()),
            reputations: Mutex::new(VecDeque::new()),
            leaderboards: Mutex::new(VecDeque::new()),
            toggle_calls: Mutex::new(Vec::new()),
            reputation_calls: AtomicUsize::new(0),
            leaderboard_calls: AtomicUsize::new(0),
        }
    }

    pub fn push_toggle(&self, reply: Result<ToggleResponse, ApiError>) {
        self.toggles.lock().unwrap().push_back(ready(reply));
    }

    pub fn gate_toggle(&self) -> oneshot::Sender<Result<ToggleResponse, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.toggles.lock().unwrap().push_back(rx);
        tx
    }

    pub fn push_reputation(&self, reply: Result<Reputation, ApiError>) {
        self.reputations.lock().unwrap().push_back(ready(reply));
    }

    pub fn gate_reputation(&self) -> oneshot::Sender<Result<Reputation, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.reputations.lock().unwrap().push_back(rx);
        tx
    }

    pub fn push_leaderboard(&self, reply: Result<Vec<LeaderboardEntry>, ApiError>) {
        self.leaderboards.lock().unwrap().push_back(ready(reply));
    }

    pub fn gate_leaderboard(&self) -> oneshot::Sender<Result<Vec<LeaderboardEntry>, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.leaderboards.lock().unwrap().push_back(rx);
        tx
    }

    pub fn toggle_calls(&self) -> Vec<(ContentKind, String)> {
        self.toggle_calls.lock().unwrap().clone()
    }

    pub fn reputation_calls(&self) -> usize {
        self.reputation_calls.load(Ordering::SeqCst)
    }

    pub fn leaderboard_calls(&self) -> usize {
        self.leaderboard_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PopularityApi for MockApi {
    async fn toggle(&self, kind: ContentKind, content_id: &str) -> Result<ToggleResponse, ApiError> {
        self.toggle_calls
            .lock()
            .unwrap()
            .push((kind, content_id.to_string()));
        next(&self.toggles).await
    }

    async fn reputation(&self, _user_id: &str) -> Result<Reputation, ApiError> {
        self.reputation_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.reputations).await
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.leaderboard_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.leaderboards).await
    }
}

pub fn entry(user_id: &str, total_reputation: i64) -> LeaderboardEntry {
    LeaderboardEntry {
        user_id: user_id.to_string(),
        full_name: format!("User {}", user_id),
        username: user_id.to_string(),
        profile_picture: None,
        total_reputation,
        total_posts: None,
        total_comments: None,
    }
}
