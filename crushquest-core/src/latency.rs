//! Simulated network latency over a synchronous [`Repository`].
//!
//! Every fetch sleeps for a fixed delay and then reads the wrapped
//! repository. There is no cancellation, retry or timeout; dropping a fetch
//! future before it resolves leaves nothing behind.
use std::time::Duration;
use tokio::time::sleep;

use crate::config::EngineConfig;
use crate::data::CampusData;
use crate::feed::Confession;
use crate::game::Game;
use crate::matching::{Match, Quest, SideQuest};
use crate::repository::{LoadError, Repository};
use crate::user::User;

#[derive(Debug, Clone)]
pub struct DelayedRepository<R> {
    inner: R,
    latency: Duration,
}

impl<R> DelayedRepository<R>
where
    R: Repository,
{
    #[must_use]
    pub const fn new(inner: R, latency: Duration) -> Self {
        Self { inner, latency }
    }

    #[must_use]
    pub const fn from_config(inner: R, config: &EngineConfig) -> Self {
        Self::new(inner, config.fetch_latency())
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    #[must_use]
    pub const fn inner(&self) -> &R {
        &self.inner
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }

    /// # Errors
    ///
    /// Returns an error if the wrapped repository fails.
    pub async fn fetch_games(&self) -> Result<Vec<Game>, LoadError> {
        self.pause().await;
        self.inner.list_games()
    }

    /// # Errors
    ///
    /// Returns an error if the wrapped repository fails.
    pub async fn fetch_matches(&self) -> Result<Vec<Match>, LoadError> {
        self.pause().await;
        self.inner.list_matches()
    }

    /// # Errors
    ///
    /// Returns an error if the wrapped repository fails.
    pub async fn fetch_quests(&self) -> Result<Vec<Quest>, LoadError> {
        self.pause().await;
        self.inner.list_quests()
    }

    /// # Errors
    ///
    /// Returns an error if the wrapped repository fails.
    pub async fn fetch_side_quests(&self) -> Result<Vec<SideQuest>, LoadError> {
        self.pause().await;
        self.inner.list_side_quests()
    }

    /// # Errors
    ///
    /// Returns an error if the wrapped repository fails.
    pub async fn fetch_confessions(&self) -> Result<Vec<Confession>, LoadError> {
        self.pause().await;
        self.inner.list_confessions()
    }

    /// # Errors
    ///
    /// Returns an error if the wrapped repository fails.
    pub async fn fetch_users(&self) -> Result<Vec<User>, LoadError> {
        self.pause().await;
        self.inner.list_users()
    }

    /// Fetch every collection concurrently, failing on the first error.
    ///
    /// # Errors
    ///
    /// Returns an error if any collection cannot be loaded; nothing partial
    /// is returned.
    pub async fn fetch_all(&self) -> Result<CampusData, LoadError> {
        let (users, confessions, matches, games, quests, side_quests) = tokio::join!(
            self.fetch_users(),
            self.fetch_confessions(),
            self.fetch_matches(),
            self.fetch_games(),
            self.fetch_quests(),
            self.fetch_side_quests(),
        );
        Ok(CampusData {
            users: users?,
            confessions: confessions?,
            matches: matches?,
            games: games?,
            quests: quests?,
            side_quests: side_quests?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Collection, StaticRepository};

    struct OfflineRepository;

    impl Repository for OfflineRepository {
        fn list_games(&self) -> Result<Vec<Game>, LoadError> {
            Ok(Vec::new())
        }
        fn list_matches(&self) -> Result<Vec<Match>, LoadError> {
            Err(LoadError::failure(Collection::Matches, "offline"))
        }
        fn list_quests(&self) -> Result<Vec<Quest>, LoadError> {
            Ok(Vec::new())
        }
        fn list_side_quests(&self) -> Result<Vec<SideQuest>, LoadError> {
            Ok(Vec::new())
        }
        fn list_confessions(&self) -> Result<Vec<Confession>, LoadError> {
            Ok(Vec::new())
        }
        fn list_users(&self) -> Result<Vec<User>, LoadError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_configured_latency() {
        let repo = DelayedRepository::from_config(
            StaticRepository::bundled(),
            &EngineConfig::default(),
        );
        let started = tokio::time::Instant::now();
        assert_eq!(repo.latency(), Duration::from_millis(100));
        let games = repo.fetch_games().await.unwrap();
        assert_eq!(games.len(), 3);
        assert_eq!(repo.inner().data().games, games);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_all_runs_concurrently() {
        let repo = DelayedRepository::new(StaticRepository::bundled(), Duration::from_millis(100));
        let started = tokio::time::Instant::now();
        let data = repo.fetch_all().await.unwrap();
        assert_eq!(&data, CampusData::default_data());
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn fetch_all_surfaces_failures() {
        let repo = DelayedRepository::new(OfflineRepository, Duration::ZERO);
        let err = repo.fetch_all().await.unwrap_err();
        assert_eq!(err, LoadError::failure(Collection::Matches, "offline"));
    }
}
