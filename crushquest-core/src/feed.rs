//! Anonymous confessions feed
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::repository::{LoadError, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfessionKind {
    #[default]
    Confession,
    DateSnap,
}

impl ConfessionKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Confession => "💭 Confession",
            Self::DateSnap => "📸 Date Snap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Heart,
    Laugh,
    Blush,
    Shy,
}

impl ReactionKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Laugh => "laugh",
            Self::Blush => "blush",
            Self::Shy => "shy",
        }
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Named reaction counters. Missing buckets read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Reactions(BTreeMap<ReactionKind, u32>);

impl Reactions {
    #[must_use]
    pub fn count(&self, kind: ReactionKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Bump `kind` by one and return the new count.
    pub fn increment(&mut self, kind: ReactionKind) -> u32 {
        let count = self.0.entry(kind).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    #[must_use]
    pub fn with(mut self, kind: ReactionKind, count: u32) -> Self {
        self.0.insert(kind, count);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReactionKind, u32)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confession {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ConfessionKind,
    pub author_uid: String,
    pub anon_name: String,
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub blurred: bool,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Confession {
    /// The third reaction button: `blush` when present, else `shy`.
    #[must_use]
    pub fn secondary_reaction(&self) -> Option<ReactionKind> {
        if self.reactions.count(ReactionKind::Blush) > 0 {
            Some(ReactionKind::Blush)
        } else if self.reactions.count(ReactionKind::Shy) > 0 {
            Some(ReactionKind::Shy)
        } else {
            None
        }
    }

    /// First letter of the anonymous name, upper-cased, for the avatar bubble.
    #[must_use]
    pub fn avatar_initial(&self) -> Option<char> {
        self.anon_name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }

    #[must_use]
    pub fn age_label(&self, now: NaiveDateTime) -> String {
        relative_age(self.timestamp, now)
    }
}

/// `Just now`, `5h ago` or `2d ago`.
#[must_use]
pub fn relative_age(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let hours = (now - timestamp).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("post {0} is not in the feed")]
    UnknownPost(String),
    #[error(transparent)]
    Load(#[from] LoadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    Accepted { kind: ReactionKind, count: u32 },
    AlreadyReacted,
}

/// One viewer's feed: the posts plus their reaction and blur bookkeeping.
///
/// Reaction history survives reloads; blur state is reseeded from each
/// post's `blurred` flag every time posts are replaced.
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    posts: Vec<Confession>,
    reacted: HashMap<String, ReactionKind>,
    blurred: HashMap<String, bool>,
}

impl FeedView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_confessions(confessions: Vec<Confession>) -> Self {
        let mut view = Self::new();
        view.replace_posts(confessions);
        view
    }

    /// Swap in a fresh set of posts, newest first.
    pub fn replace_posts(&mut self, mut confessions: Vec<Confession>) {
        confessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.blurred = confessions
            .iter()
            .map(|post| (post.id.clone(), post.blurred))
            .collect();
        self.posts = confessions;
    }

    /// Reload from `repo`. On failure the current posts stay in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot list confessions.
    pub fn refresh<R>(&mut self, repo: &R) -> Result<usize, FeedError>
    where
        R: Repository + ?Sized,
    {
        match repo.list_confessions() {
            Ok(confessions) => {
                self.replace_posts(confessions);
                Ok(self.posts.len())
            }
            Err(err) => {
                log::warn!("keeping {} cached posts: {err}", self.posts.len());
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn posts(&self) -> &[Confession] {
        &self.posts
    }

    #[must_use]
    pub fn post(&self, post_id: &str) -> Option<&Confession> {
        self.posts.iter().find(|post| post.id == post_id)
    }

    /// React to a post. Each viewer gets one reaction per post.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownPost`] if the post is not in the feed.
    pub fn react(&mut self, post_id: &str, kind: ReactionKind) -> Result<ReactionOutcome, FeedError> {
        let Some(post) = self.posts.iter_mut().find(|post| post.id == post_id) else {
            return Err(FeedError::UnknownPost(post_id.to_string()));
        };
        if self.reacted.contains_key(post_id) {
            log::debug!("ignoring repeat {kind} reaction on {post_id}");
            return Ok(ReactionOutcome::AlreadyReacted);
        }
        let count = post.reactions.increment(kind);
        self.reacted.insert(post_id.to_string(), kind);
        Ok(ReactionOutcome::Accepted { kind, count })
    }

    #[must_use]
    pub fn has_reacted(&self, post_id: &str) -> bool {
        self.reacted.contains_key(post_id)
    }

    #[must_use]
    pub fn reaction_for(&self, post_id: &str) -> Option<ReactionKind> {
        self.reacted.get(post_id).copied()
    }

    /// Flip the blur on a post image, returning whether it is now blurred.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownPost`] if the post is not in the feed.
    pub fn toggle_blur(&mut self, post_id: &str) -> Result<bool, FeedError> {
        let blurred = self
            .blurred
            .get_mut(post_id)
            .ok_or_else(|| FeedError::UnknownPost(post_id.to_string()))?;
        *blurred = !*blurred;
        Ok(*blurred)
    }

    #[must_use]
    pub fn is_blurred(&self, post_id: &str) -> bool {
        self.blurred.get(post_id).copied().unwrap_or(false)
    }
}
