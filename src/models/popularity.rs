use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

/// The three kinds of content that can be liked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Profile,
    Comment,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Post, ContentKind::Profile, ContentKind::Comment];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Profile => "profile",
            ContentKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached popularity of one content item.
///
/// `count` and `liked_by_current_user` are tracked separately from `likers`
/// so an optimistic update can move them before the backend answers. Outside
/// of an in-flight toggle they agree with `likers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularityRecord {
    pub likers: BTreeSet<String>,
    pub count: u64,
    pub liked_by_current_user: bool,
}

impl PopularityRecord {
    /// Derive a record from a server-provided liker list.
    pub fn from_likers<I, S>(likers: I, current_user: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let likers: BTreeSet<String> = likers.into_iter().map(Into::into).collect();
        let liked_by_current_user = likers.contains(current_user);
        Self {
            count: likers.len() as u64,
            likers,
            liked_by_current_user,
        }
    }

    /// The state after `user` flips their like. Count is floored at zero.
    pub fn flipped(&self, user: &str) -> Self {
        let mut next = self.clone();
        if self.liked_by_current_user {
            next.likers.remove(user);
            next.count = self.count.saturating_sub(1);
            next.liked_by_current_user = false;
        } else {
            next.likers.insert(user.to_string());
            next.count = self.count + 1;
            next.liked_by_current_user = true;
        }
        next
    }

    pub fn is_consistent(&self, user: &str) -> bool {
        self.count == self.likers.len() as u64
            && self.liked_by_current_user == self.likers.contains(user)
    }
}
