//! Data-access and session-store seams.
//!
//! The app reads every collection through a [`Repository`]; the bundled
//! implementation serves the static mock data. The logged-in user lives in
//! a [`SessionStore`] as one opaque JSON record.
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

use crate::data::CampusData;
use crate::feed::Confession;
use crate::game::Game;
use crate::matching::{Match, Quest, SideQuest};
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Games,
    Matches,
    Quests,
    SideQuests,
    Confessions,
    Users,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Games => "games",
            Self::Matches => "matches",
            Self::Quests => "quests",
            Self::SideQuests => "side quests",
            Self::Confessions => "confessions",
            Self::Users => "users",
        };
        f.write_str(name)
    }
}

/// Transient failure reading a collection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to load {collection}: {reason}")]
    LoadFailure {
        collection: Collection,
        reason: String,
    },
}

impl LoadError {
    #[must_use]
    pub fn failure(collection: Collection, reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            collection,
            reason: reason.into(),
        }
    }
}

/// Trait for abstracting data loading operations
///
/// Every listing returns the full collection; there is no filtering or
/// pagination at this layer.
pub trait Repository {
    /// # Errors
    ///
    /// Returns an error if the games cannot be loaded.
    fn list_games(&self) -> Result<Vec<Game>, LoadError>;

    /// # Errors
    ///
    /// Returns an error if the matches cannot be loaded.
    fn list_matches(&self) -> Result<Vec<Match>, LoadError>;

    /// # Errors
    ///
    /// Returns an error if the quests cannot be loaded.
    fn list_quests(&self) -> Result<Vec<Quest>, LoadError>;

    /// # Errors
    ///
    /// Returns an error if the side quests cannot be loaded.
    fn list_side_quests(&self) -> Result<Vec<SideQuest>, LoadError>;

    /// # Errors
    ///
    /// Returns an error if the confessions cannot be loaded.
    fn list_confessions(&self) -> Result<Vec<Confession>, LoadError>;

    /// # Errors
    ///
    /// Returns an error if the users cannot be loaded.
    fn list_users(&self) -> Result<Vec<User>, LoadError>;

    /// # Errors
    ///
    /// Returns an error if the users cannot be loaded.
    fn user_by_id(&self, uid: &str) -> Result<Option<User>, LoadError> {
        Ok(self.list_users()?.into_iter().find(|user| user.uid == uid))
    }

    /// # Errors
    ///
    /// Returns an error if the confessions cannot be loaded.
    fn confessions_by_user(&self, uid: &str) -> Result<Vec<Confession>, LoadError> {
        Ok(self
            .list_confessions()?
            .into_iter()
            .filter(|confession| confession.author_uid == uid)
            .collect())
    }

    /// # Errors
    ///
    /// Returns an error if the matches cannot be loaded.
    fn matches_by_user(&self, uid: &str) -> Result<Vec<Match>, LoadError> {
        Ok(self
            .list_matches()?
            .into_iter()
            .filter(|m| m.involves(uid))
            .collect())
    }
}

/// Serves a fixed in-memory [`CampusData`] snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticRepository {
    data: CampusData,
}

impl StaticRepository {
    #[must_use]
    pub const fn new(data: CampusData) -> Self {
        Self { data }
    }

    /// Repository over the bundled mock data set.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(CampusData::default_data().clone())
    }

    #[must_use]
    pub const fn data(&self) -> &CampusData {
        &self.data
    }
}

impl Repository for StaticRepository {
    fn list_games(&self) -> Result<Vec<Game>, LoadError> {
        Ok(self.data.games.clone())
    }

    fn list_matches(&self) -> Result<Vec<Match>, LoadError> {
        Ok(self.data.matches.clone())
    }

    fn list_quests(&self) -> Result<Vec<Quest>, LoadError> {
        Ok(self.data.quests.clone())
    }

    fn list_side_quests(&self) -> Result<Vec<SideQuest>, LoadError> {
        Ok(self.data.side_quests.clone())
    }

    fn list_confessions(&self) -> Result<Vec<Confession>, LoadError> {
        Ok(self.data.confessions.clone())
    }

    fn list_users(&self) -> Result<Vec<User>, LoadError> {
        Ok(self.data.users.clone())
    }
}

/// Trait for abstracting the logged-in user record
/// Platform-specific implementations should provide this
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the stored record, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn read(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the stored record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn write(&self, record: &str) -> Result<(), Self::Error>;

    /// Remove the stored record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    fn clear(&self) -> Result<(), Self::Error>;
}

/// Session store kept in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    record: Rc<RefCell<Option<String>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    type Error = Infallible;

    fn read(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.record.borrow().clone())
    }

    fn write(&self, record: &str) -> Result<(), Self::Error> {
        *self.record.borrow_mut() = Some(record.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), Self::Error> {
        self.record.borrow_mut().take();
        Ok(())
    }
}
