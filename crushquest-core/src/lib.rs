//! CrushQuest Core
//!
//! Platform-agnostic logic for the CrushQuest campus app: compatibility
//! games, matches and quests, the anonymous confessions feed and the mock
//! login flow. This crate carries no UI or platform-specific dependencies.

pub mod auth;
pub mod config;
pub mod data;
pub mod feed;
pub mod game;
#[cfg(feature = "async")]
pub mod latency;
pub mod matching;
pub mod profile;
pub mod repository;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use auth::{AuthError, current_user, login, logout};
pub use config::{AnswerMatching, ConfigError, EngineConfig};
pub use data::CampusData;
pub use feed::{
    Comment, Confession, ConfessionKind, FeedError, FeedView, ReactionKind, ReactionOutcome,
    Reactions, relative_age,
};
pub use game::{Game, InteractionMode, Question, derive_choice_options};
#[cfg(feature = "async")]
pub use latency::DelayedRepository;
pub use matching::{
    GameAnswers, Match, MatchBoard, MatchError, MatchStatus, Quest, QuestProgress, SideQuest,
    matches_for_user,
};
pub use profile::ProfileStats;
pub use repository::{
    Collection, LoadError, MemorySessionStore, Repository, SessionStore, StaticRepository,
};
pub use session::{
    CompletedGame, GameSession, Progress, SessionAction, SessionError, SessionState,
    SubmitOutcome,
};
pub use user::{SessionUser, User};

use anyhow::Context;

/// Main entry point tying a data repository to a session store
pub struct CrushQuest<R, S>
where
    R: Repository,
    S: SessionStore,
{
    repository: R,
    store: S,
    config: EngineConfig,
}

impl<R, S> CrushQuest<R, S>
where
    R: Repository,
    S: SessionStore,
{
    /// Create a new app core with the provided repository and session store
    pub fn new(repository: R, store: S) -> Self {
        Self::with_config(repository, store, EngineConfig::default())
    }

    pub const fn with_config(repository: R, store: S, config: EngineConfig) -> Self {
        Self {
            repository,
            store,
            config,
        }
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn repository(&self) -> &R {
        &self.repository
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fresh idle session honouring the configured answer matching
    #[must_use]
    pub fn new_session(&self) -> GameSession {
        GameSession::with_matching(self.config.answer_matching)
    }

    /// # Errors
    ///
    /// Returns an error if the games cannot be loaded.
    pub fn games(&self) -> Result<Vec<Game>, LoadError> {
        self.repository
            .list_games()
            .inspect_err(|err| log::warn!("error loading games: {err}"))
    }

    /// Look up `game_id` and start it on `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if games cannot be loaded, the id is unknown, or the
    /// game cannot be played. The session is untouched on error.
    pub fn start_game(&self, session: &mut GameSession, game_id: &str) -> anyhow::Result<()> {
        let game = self
            .games()?
            .into_iter()
            .find(|game| game.id == game_id)
            .with_context(|| format!("unknown game {game_id}"))?;
        session
            .start(game)
            .with_context(|| format!("failed to start {game_id}"))
    }

    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or a collaborator fails.
    pub fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        auth::login(&self.repository, &self.store, email, password)
    }

    /// # Errors
    ///
    /// Returns an error if the session store cannot be cleared.
    pub fn logout(&self) -> Result<(), AuthError> {
        auth::logout(&self.store)
    }

    /// # Errors
    ///
    /// Returns an error if the session store is unreadable.
    pub fn current_user(&self) -> Result<Option<SessionUser>, AuthError> {
        auth::current_user(&self.store)
    }

    /// Statistics for the logged-in user, or `None` when logged out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the matches cannot be loaded.
    pub fn profile_stats(&self) -> anyhow::Result<Option<ProfileStats>> {
        let Some(user) = self.current_user()? else {
            return Ok(None);
        };
        let matches = self
            .repository
            .list_matches()
            .inspect_err(|err| log::warn!("error loading profile: {err}"))
            .context("error loading profile")?;
        Ok(Some(ProfileStats::compute(&user, &matches)))
    }

    /// # Errors
    ///
    /// Returns an error if the confessions cannot be loaded.
    pub fn load_feed(&self) -> Result<FeedView, FeedError> {
        let mut feed = FeedView::new();
        feed.refresh(&self.repository)?;
        Ok(feed)
    }

    /// # Errors
    ///
    /// Returns the first collection failure.
    pub fn match_board(&self) -> Result<MatchBoard, LoadError> {
        MatchBoard::load(&self.repository)
    }
}

/// App core over the bundled mock data and an in-memory session store
pub type BundledApp = CrushQuest<StaticRepository, MemorySessionStore>;

impl Default for BundledApp {
    fn default() -> Self {
        Self::new(StaticRepository::bundled(), MemorySessionStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Serves bundled data until switched offline.
    struct FlakyRepository {
        inner: StaticRepository,
        offline: Cell<bool>,
    }

    impl FlakyRepository {
        fn check(&self, collection: Collection) -> Result<(), LoadError> {
            if self.offline.get() {
                Err(LoadError::failure(collection, "I/O unavailable"))
            } else {
                Ok(())
            }
        }
    }

    impl Repository for FlakyRepository {
        fn list_games(&self) -> Result<Vec<Game>, LoadError> {
            self.check(Collection::Games)?;
            self.inner.list_games()
        }

        fn list_matches(&self) -> Result<Vec<Match>, LoadError> {
            self.check(Collection::Matches)?;
            self.inner.list_matches()
        }

        fn list_quests(&self) -> Result<Vec<Quest>, LoadError> {
            self.check(Collection::Quests)?;
            self.inner.list_quests()
        }

        fn list_side_quests(&self) -> Result<Vec<SideQuest>, LoadError> {
            self.check(Collection::SideQuests)?;
            self.inner.list_side_quests()
        }

        fn list_confessions(&self) -> Result<Vec<Confession>, LoadError> {
            self.check(Collection::Confessions)?;
            self.inner.list_confessions()
        }

        fn list_users(&self) -> Result<Vec<User>, LoadError> {
            self.check(Collection::Users)?;
            self.inner.list_users()
        }
    }

    fn flaky_app() -> CrushQuest<FlakyRepository, MemorySessionStore> {
        let repo = FlakyRepository {
            inner: StaticRepository::bundled(),
            offline: Cell::new(false),
        };
        CrushQuest::new(repo, MemorySessionStore::new())
    }

    #[test]
    fn plays_this_or_that_to_completion() {
        let app = BundledApp::default();
        let mut session = app.new_session();
        app.start_game(&mut session, "game_001").unwrap();
        for answer in ["Coffee", "Beach", "Movies", "Early Bird", "Pizza"] {
            session.submit_answer(answer).unwrap();
        }
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(
            session.answers(),
            ["Coffee", "Beach", "Movies", "Early Bird", "Pizza"]
        );
    }

    #[test]
    fn unknown_game_leaves_session_idle() {
        let app = BundledApp::default();
        let mut session = app.new_session();
        let err = app.start_game(&mut session, "game_404").unwrap_err();
        assert!(err.to_string().contains("unknown game game_404"));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn configured_matching_reaches_sessions() {
        let config = EngineConfig::default().with_answer_matching(AnswerMatching::CaseInsensitive);
        let app = CrushQuest::with_config(
            StaticRepository::bundled(),
            MemorySessionStore::new(),
            config,
        );
        let mut session = app.new_session();
        app.start_game(&mut session, "game_003").unwrap();
        session.submit_answer("introvert").unwrap();
        assert_eq!(session.answers(), ["Introvert"]);
    }

    #[test]
    fn profile_requires_login() {
        let app = BundledApp::default();
        assert_eq!(app.profile_stats().unwrap(), None);

        app.login("aditi@usf.edu", "aditi123").unwrap();
        let stats = app.profile_stats().unwrap().unwrap();
        assert_eq!(stats.total_matches, 2);
        assert_eq!(stats.total_posts, 2);
        assert_eq!(stats.quests_completed, 1);

        app.logout().unwrap();
        assert!(app.current_user().unwrap().is_none());
    }

    #[test]
    fn load_failures_leave_state_in_place() {
        let app = flaky_app();
        let mut feed = app.load_feed().unwrap();
        feed.react("post_009", ReactionKind::Heart).unwrap();
        let mut board = app.match_board().unwrap();

        app.repository().offline.set(true);
        assert!(matches!(
            feed.refresh(app.repository()),
            Err(FeedError::Load(LoadError::LoadFailure {
                collection: Collection::Confessions,
                ..
            }))
        ));
        assert_eq!(feed.posts().len(), 4);
        assert_eq!(
            feed.post("post_009").unwrap().reactions.count(ReactionKind::Heart),
            13
        );

        assert!(board.reload(app.repository()).is_err());
        assert_eq!(board.matches.len(), 2);
        assert!(matches!(
            app.match_board(),
            Err(LoadError::LoadFailure {
                collection: Collection::Matches,
                ..
            })
        ));
        assert!(matches!(app.games(), Err(LoadError::LoadFailure { .. })));

        let mut session = app.new_session();
        assert!(app.start_game(&mut session, "game_001").is_err());
        assert!(matches!(
            app.login("aditi@usf.edu", "aditi123"),
            Err(AuthError::Load(_))
        ));
    }

    #[test]
    fn profile_stats_surfaces_match_load_failure() {
        let app = flaky_app();
        app.login("aditi@usf.edu", "aditi123").unwrap();
        app.repository().offline.set(true);
        let err = app.profile_stats().unwrap_err();
        assert!(err.to_string().contains("error loading profile"));
        assert!(app.current_user().unwrap().is_some());
    }
}
