//! Optimistic popularity cache.
//!
//! Each toggle moves its subject `(kind, content id, user)` through
//! `Idle -> Pending(pre-state) -> Confirmed | RolledBack -> Idle`. The
//! pre-state snapshot lives in the pending table for exactly as long as the
//! backend call is outstanding.

use crate::{
    client::PopularityApi,
    dto::ToggleResponse,
    errors::ApiError,
    models::{ContentKind, PopularityRecord},
    notify::{Notification, Notifier},
};
use dashmap::{DashMap, mapref::entry::Entry};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

type Subject = (ContentKind, String, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// A toggle for the same content and user has not settled yet.
    InFlight,
    /// No record has been initialized for the content id.
    Uninitialized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ToggleOutcome {
    Confirmed { record: PopularityRecord },
    RolledBack { record: PopularityRecord },
    Skipped { reason: SkipReason },
}

/// Clears the pending marker for a subject when the toggle settles, however
/// it settles. If the toggle future is dropped before the backend answered,
/// the record goes back to its pre-toggle state.
struct PendingGuard<'a> {
    pending: &'a DashMap<Subject, PopularityRecord>,
    records: &'a DashMap<String, PopularityRecord>,
    subject: Subject,
    before: PopularityRecord,
    settled: bool,
}

impl PendingGuard<'_> {
    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let (kind, content_id, _) = &self.subject;
            if let Some(mut record) = self.records.get_mut(content_id) {
                *record = self.before.clone();
            }
            warn!(%kind, content_id = %content_id, "toggle abandoned before the backend answered, rolled back");
        }
        self.pending.remove(&self.subject);
    }
}

pub struct PopularityStore {
    posts: DashMap<String, PopularityRecord>,
    profiles: DashMap<String, PopularityRecord>,
    comments: DashMap<String, PopularityRecord>,
    pending: DashMap<Subject, PopularityRecord>,
    api: Arc<dyn PopularityApi>,
    notifier: Arc<dyn Notifier>,
}

impl PopularityStore {
    pub fn new(api: Arc<dyn PopularityApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            posts: DashMap::new(),
            profiles: DashMap::new(),
            comments: DashMap::new(),
            pending: DashMap::new(),
            api,
            notifier,
        }
    }

    fn cache(&self, kind: ContentKind) -> &DashMap<String, PopularityRecord> {
        match kind {
            ContentKind::Post => &self.posts,
            ContentKind::Profile => &self.profiles,
            ContentKind::Comment => &self.comments,
        }
    }

    /// Seed a record from a server snapshot. Returns `false` if the id was
    /// already known, in which case the existing record is left untouched.
    pub fn initialize<I, S>(
        &self,
        kind: ContentKind,
        content_id: &str,
        likers: I,
        current_user: &str,
    ) -> Result<bool, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiError::require_id("content id", content_id)?;
        match self.cache(kind).entry(content_id.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(PopularityRecord::from_likers(likers, current_user));
                Ok(true)
            }
        }
    }

    /// Seed many records at once, first write wins per id. Returns how many
    /// records were created.
    pub fn initialize_batch<I, L, S>(
        &self,
        kind: ContentKind,
        items: I,
        current_user: &str,
    ) -> Result<usize, ApiError>
    where
        I: IntoIterator<Item = (String, L)>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut created = 0;
        for (content_id, likers) in items {
            if self.initialize(kind, &content_id, likers, current_user)? {
                created += 1;
            }
        }
        debug!(%kind, created, "hydrated popularity batch");
        Ok(created)
    }

    /// Replace a record with a fresh server snapshot regardless of what the
    /// cache holds.
    pub fn force_update<I, S>(
        &self,
        kind: ContentKind,
        content_id: &str,
        likers: I,
        current_user: &str,
    ) -> Result<PopularityRecord, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiError::require_id("content id", content_id)?;
        let record = PopularityRecord::from_likers(likers, current_user);
        self.cache(kind)
            .insert(content_id.to_string(), record.clone());
        Ok(record)
    }

    /// Flip `current_user`'s like on a content item.
    ///
    /// The cache changes before the backend is contacted. The backend reply
    /// then replaces the optimistic guess, or a failure restores the state
    /// captured before the flip. Only empty ids are reported as errors.
    pub async fn toggle(
        &self,
        kind: ContentKind,
        content_id: &str,
        current_user: &str,
    ) -> Result<ToggleOutcome, ApiError> {
        ApiError::require_id("content id", content_id)?;
        ApiError::require_id("user id", current_user)?;

        let subject = (kind, content_id.to_string(), current_user.to_string());
        let before = {
            let slot = match self.pending.entry(subject.clone()) {
                Entry::Occupied(_) => {
                    debug!(%kind, content_id, user = current_user, "toggle already in flight");
                    return Ok(ToggleOutcome::Skipped {
                        reason: SkipReason::InFlight,
                    });
                }
                Entry::Vacant(slot) => slot,
            };
            let Some(mut record) = self.cache(kind).get_mut(content_id) else {
                warn!(%kind, content_id, "toggle on uninitialized popularity record");
                return Ok(ToggleOutcome::Skipped {
                    reason: SkipReason::Uninitialized,
                });
            };
            let before = record.value().clone();
            *record = before.flipped(current_user);
            slot.insert(before.clone());
            before
        };
        let mut guard = PendingGuard {
            pending: &self.pending,
            records: self.cache(kind),
            subject,
            before: before.clone(),
            settled: false,
        };

        let result = self.api.toggle(kind, content_id).await;
        guard.settle();

        match result {
            Ok(reply) => {
                let confirmed = self.apply(kind, content_id, |optimistic| {
                    reconcile(&before, optimistic, &reply, current_user)
                });
                info!(
                    %kind,
                    content_id,
                    liked = confirmed.liked_by_current_user,
                    count = confirmed.count,
                    "popularity confirmed"
                );
                Ok(ToggleOutcome::Confirmed { record: confirmed })
            }
            Err(ApiError::MalformedResponse(msg)) => {
                warn!(%kind, content_id, "keeping optimistic popularity, unreadable reply: {}", msg);
                Ok(ToggleOutcome::Confirmed {
                    record: self.get_record(kind, content_id),
                })
            }
            Err(e) => {
                warn!(%kind, content_id, "popularity toggle failed, rolling back: {}", e);
                let restored = self.apply(kind, content_id, |_| before.clone());
                self.notifier.notify(Notification::error(format!(
                    "Could not update {} like. Please try again.",
                    kind
                )));
                Ok(ToggleOutcome::RolledBack { record: restored })
            }
        }
    }

    /// Overwrite a record that is still cached. A record dropped by `reset`
    /// while the call was out stays dropped.
    fn apply<F>(&self, kind: ContentKind, content_id: &str, next: F) -> PopularityRecord
    where
        F: FnOnce(&PopularityRecord) -> PopularityRecord,
    {
        match self.cache(kind).get_mut(content_id) {
            Some(mut record) => {
                let updated = next(record.value());
                *record = updated.clone();
                updated
            }
            None => PopularityRecord::default(),
        }
    }

    pub fn get_record(&self, kind: ContentKind, content_id: &str) -> PopularityRecord {
        self.cache(kind)
            .get(content_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    pub fn is_liked(&self, kind: ContentKind, content_id: &str) -> bool {
        self.cache(kind)
            .get(content_id)
            .is_some_and(|r| r.liked_by_current_user)
    }

    pub fn get_count(&self, kind: ContentKind, content_id: &str) -> u64 {
        self.cache(kind).get(content_id).map_or(0, |r| r.count)
    }

    pub fn is_pending(&self, kind: ContentKind, content_id: &str, current_user: &str) -> bool {
        self.pending
            .contains_key(&(kind, content_id.to_string(), current_user.to_string()))
    }

    /// Drop every cached record, e.g. when the session ends.
    pub fn reset(&self) {
        for kind in ContentKind::ALL {
            self.cache(kind).clear();
        }
        info!("popularity cache cleared");
    }
}

/// Turn a backend reply into the confirmed record.
///
/// An explicit liker list is authoritative and its size is the count, even
/// when the reply's `popularity` disagrees. A bare count only says whether
/// it went up relative to `before`, which decides the liked flag. A reply
/// with neither keeps the optimistic state.
fn reconcile(
    before: &PopularityRecord,
    optimistic: &PopularityRecord,
    reply: &ToggleResponse,
    user: &str,
) -> PopularityRecord {
    if let Some(likers) = &reply.popularity_array {
        return PopularityRecord::from_likers(likers.iter().cloned(), user);
    }
    if let Some(count) = reply.popularity {
        let liked = count > before.count;
        let mut likers = before.likers.clone();
        if liked {
            likers.insert(user.to_string());
        } else {
            likers.remove(user);
        }
        return PopularityRecord {
            likers,
            count,
            liked_by_current_user: liked,
        };
    }
    optimistic.clone()
}
