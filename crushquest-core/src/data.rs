use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::feed::Confession;
use crate::game::Game;
use crate::matching::{Match, Quest, SideQuest};
use crate::user::{SessionUser, User};

const DEFAULT_CAMPUS_DATA: &str = include_str!("../assets/data/campus.json");

/// Container for every mock collection the app serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CampusData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub confessions: Vec<Confession>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub quests: Vec<Quest>,
    #[serde(default)]
    pub side_quests: Vec<SideQuest>,
}

impl CampusData {
    /// Create empty campus data (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load campus data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid campus data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse the bundled data set, falling back to empty data if it is
    /// malformed.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CAMPUS_DATA).unwrap_or_else(|err| {
            log::warn!("bundled campus data is invalid: {err}");
            Self::empty()
        })
    }

    /// Shared parsed copy of the bundled data set.
    #[must_use]
    pub fn default_data() -> &'static Self {
        static DATA: OnceLock<CampusData> = OnceLock::new();
        DATA.get_or_init(Self::load_from_static)
    }

    #[must_use]
    pub fn game(&self, game_id: &str) -> Option<&Game> {
        self.games.iter().find(|game| game.id == game_id)
    }

    #[must_use]
    pub fn quest(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.iter().find(|quest| quest.quest_id == quest_id)
    }

    #[must_use]
    pub fn user(&self, uid: &str) -> Option<&User> {
        self.users.iter().find(|user| user.uid == uid)
    }

    #[must_use]
    pub fn session_user(&self, uid: &str) -> Option<SessionUser> {
        self.user(uid).cloned().map(SessionUser::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::InteractionMode;

    #[test]
    fn bundled_data_parses() {
        let data = CampusData::from_json(DEFAULT_CAMPUS_DATA).unwrap();
        assert_eq!(data.users.len(), 2);
        assert_eq!(data.confessions.len(), 4);
        assert_eq!(data.matches.len(), 2);
        assert_eq!(data.games.len(), 3);
        assert_eq!(data.quests.len(), 4);
        assert_eq!(data.side_quests.len(), 2);
        assert_eq!(CampusData::default_data(), &data);
    }

    #[test]
    fn bundled_games_are_playable() {
        let data = CampusData::load_from_static();
        let this_or_that = data.game("game_001").unwrap();
        assert_eq!(this_or_that.name, "This or That");
        assert_eq!(this_or_that.mode, InteractionMode::Choice);
        assert_eq!(this_or_that.question_count(), 5);
        assert_eq!(
            data.quest("quest_004").map(|q| q.location.as_str()),
            Some("Campus Garden")
        );
        for game in &data.games {
            assert_eq!(game.first_unanswerable_question(), None, "{}", game.id);
        }
    }

    #[test]
    fn explicit_options_agree_with_prompts() {
        let data = CampusData::load_from_static();
        for game in data.games.iter().filter(|g| g.mode == InteractionMode::Choice) {
            for question in &game.questions {
                assert_eq!(
                    question.options.clone().unwrap_or_default(),
                    crate::game::derive_choice_options(&question.prompt),
                    "{}",
                    question.prompt
                );
            }
        }
    }

    #[test]
    fn test_campus_data_from_json() {
        let json = r#"{
            "games": [
                {
                    "game_id": "g1",
                    "name": "Test Game",
                    "type": "text",
                    "questions": [{ "q": "Why?" }]
                }
            ]
        }"#;

        let data = CampusData::from_json(json).unwrap();
        assert_eq!(data.games.len(), 1);
        assert_eq!(data.games[0].mode, InteractionMode::Text);
        assert!(data.users.is_empty());
        assert!(data.game("missing").is_none());
        assert!(data.quest("quest_001").is_none());
    }
}
