use crate::{
    client::PopularityApi,
    errors::ApiError,
    models::{LeaderboardEntry, LeaderboardSnapshot},
};
use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

struct Board {
    snapshot: LeaderboardSnapshot,
    /// Ticket of the fetch whose result is on display.
    applied: u64,
}

/// Counts a fetch as outstanding until it settles or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct LeaderboardStore {
    board: RwLock<Board>,
    in_flight: AtomicUsize,
    tickets: AtomicU64,
    api: Arc<dyn PopularityApi>,
}

impl LeaderboardStore {
    pub fn new(api: Arc<dyn PopularityApi>) -> Self {
        Self {
            board: RwLock::new(Board {
                snapshot: LeaderboardSnapshot::default(),
                applied: 0,
            }),
            in_flight: AtomicUsize::new(0),
            tickets: AtomicU64::new(0),
            api,
        }
    }

    /// Fetch the ranking and replace the snapshot with it. On failure the
    /// snapshot is emptied and carries the error message instead.
    ///
    /// Fetches may overlap. The snapshot stays `loading` while any of them is
    /// outstanding, and a result older than the one on display is dropped.
    pub async fn fetch(&self) -> LeaderboardSnapshot {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let flight = InFlight::enter(&self.in_flight);
        self.board.write().await.snapshot.error = None;

        let result = self.api.leaderboard().await;
        drop(flight);

        let mut board = self.board.write().await;
        if ticket > board.applied {
            board.applied = ticket;
            apply(&mut board.snapshot, result);
        } else {
            debug!(ticket, applied = board.applied, "discarding stale leaderboard");
        }
        self.with_loading(board.snapshot.clone())
    }

    pub async fn snapshot(&self) -> LeaderboardSnapshot {
        let snapshot = self.board.read().await.snapshot.clone();
        self.with_loading(snapshot)
    }

    fn with_loading(&self, mut snapshot: LeaderboardSnapshot) -> LeaderboardSnapshot {
        snapshot.loading = self.in_flight.load(Ordering::SeqCst) > 0;
        snapshot
    }
}

fn apply(snapshot: &mut LeaderboardSnapshot, result: Result<Vec<LeaderboardEntry>, ApiError>) {
    match result {
        Ok(entries) => {
            info!(users = entries.len(), "leaderboard refreshed");
            snapshot.entries = entries;
            snapshot.error = None;
        }
        Err(e) => {
            error!("failed to fetch leaderboard: {}", e);
            snapshot.entries.clear();
            snapshot.error = Some(match e {
                ApiError::MalformedResponse(_) => "Invalid leaderboard data received".into(),
                other => other.to_string(),
            });
        }
    }
}
