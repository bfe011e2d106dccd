//! Matches, quests and side quests
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::game::Game;
use crate::repository::{LoadError, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    QuestPending,
    Active,
    Completed,
    /// Any status the data carries that this build does not model
    #[serde(other)]
    Other,
}

impl MatchStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::QuestPending => "Quest Pending",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Other => "Unknown",
        }
    }
}

/// Answer sequences recorded for each participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameAnswers {
    #[serde(default)]
    pub user1: Vec<String>,
    #[serde(default)]
    pub user2: Vec<String>,
}

/// Progress of one quest within a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub quest_id: String,
    pub quest_number: u32,
    #[serde(default)]
    pub accepted_by: Vec<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    #[serde(rename = "match_id")]
    pub id: String,
    pub user1: String,
    pub user2: String,
    #[serde(default)]
    pub status: MatchStatus,
    /// Compatibility score, 0-100
    #[serde(deserialize_with = "compatibility_score")]
    pub compatibility: u8,
    pub game_played: String,
    #[serde(default)]
    pub game_answers: GameAnswers,
    #[serde(default)]
    pub quests: Vec<QuestProgress>,
    #[serde(default)]
    pub side_quests: Vec<String>,
    #[serde(default)]
    pub date_snaps_uploaded: bool,
}

/// Highest compatibility score a match may carry.
pub const MAX_COMPATIBILITY: u8 = 100;

fn compatibility_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let score = u8::deserialize(deserializer)?;
    if score > MAX_COMPATIBILITY {
        return Err(D::Error::custom(format!(
            "compatibility {score} exceeds {MAX_COMPATIBILITY}"
        )));
    }
    Ok(score)
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("match {match_id} has no quest {quest_id}")]
    UnknownQuest { match_id: String, quest_id: String },
    #[error("{uid} is not part of match {match_id}")]
    NotParticipant { match_id: String, uid: String },
}

impl Match {
    #[must_use]
    pub fn involves(&self, uid: &str) -> bool {
        self.user1 == uid || self.user2 == uid
    }

    /// The other participant, if `uid` is part of this match.
    #[must_use]
    pub fn partner_of(&self, uid: &str) -> Option<&str> {
        if self.user1 == uid {
            Some(&self.user2)
        } else if self.user2 == uid {
            Some(&self.user1)
        } else {
            None
        }
    }

    #[must_use]
    pub fn completed_quests(&self) -> usize {
        self.quests.iter().filter(|quest| quest.completed).count()
    }

    /// Name of the game this match was scored on, looked up in `games`.
    #[must_use]
    pub fn game_name<'a>(&self, games: &'a [Game]) -> Option<&'a str> {
        games
            .iter()
            .find(|game| game.id == self.game_played)
            .map(|game| game.name.as_str())
    }

    /// Record `uid` as having accepted `quest_id`. Returns `false` if they
    /// already had.
    ///
    /// # Errors
    ///
    /// Returns an error if `uid` is not a participant or the quest is not
    /// attached to this match.
    pub fn accept_quest(&mut self, quest_id: &str, uid: &str) -> Result<bool, MatchError> {
        if !self.involves(uid) {
            return Err(MatchError::NotParticipant {
                match_id: self.id.clone(),
                uid: uid.to_string(),
            });
        }
        let progress = self.quest_mut(quest_id)?;
        if progress.accepted_by.iter().any(|accepted| accepted == uid) {
            return Ok(false);
        }
        progress.accepted_by.push(uid.to_string());
        log::debug!("{uid} accepted {quest_id}");
        Ok(true)
    }

    /// Mark a quest completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the quest is not attached to this match.
    pub fn complete_quest(&mut self, quest_id: &str) -> Result<(), MatchError> {
        self.quest_mut(quest_id)?.completed = true;
        Ok(())
    }

    fn quest_mut(&mut self, quest_id: &str) -> Result<&mut QuestProgress, MatchError> {
        let match_id = &self.id;
        self.quests
            .iter_mut()
            .find(|quest| quest.quest_id == quest_id)
            .ok_or_else(|| MatchError::UnknownQuest {
                match_id: match_id.clone(),
                quest_id: quest_id.to_string(),
            })
    }
}

/// Matches in which `uid` takes part.
#[must_use]
pub fn matches_for_user<'a>(matches: &'a [Match], uid: &str) -> Vec<&'a Match> {
    matches.iter().filter(|m| m.involves(uid)).collect()
}

/// A located two-person challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub quest_id: String,
    pub location: String,
    pub description: String,
    pub user1_task: String,
    pub user2_task: String,
}

impl Quest {
    /// Task for whichever side of the match `uid` sits on.
    #[must_use]
    pub fn task_for(&self, matched: &Match, uid: &str) -> Option<&str> {
        if matched.user1 == uid {
            Some(&self.user1_task)
        } else if matched.user2 == uid {
            Some(&self.user2_task)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideQuest {
    pub side_quest_id: String,
    pub description: String,
}

/// Everything the match screen shows: matches, playable games and quests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchBoard {
    pub matches: Vec<Match>,
    pub games: Vec<Game>,
    pub quests: Vec<Quest>,
}

impl MatchBoard {
    /// Load all three collections.
    ///
    /// # Errors
    ///
    /// Returns the first collection failure.
    pub fn load<R>(repo: &R) -> Result<Self, LoadError>
    where
        R: Repository + ?Sized,
    {
        let load = || -> Result<Self, LoadError> {
            Ok(Self {
                matches: repo.list_matches()?,
                games: repo.list_games()?,
                quests: repo.list_quests()?,
            })
        };
        load().inspect_err(|err| log::warn!("error loading match data: {err}"))
    }

    /// Reload in place. On failure the board keeps its previous contents.
    ///
    /// # Errors
    ///
    /// Returns the first collection failure.
    pub fn reload<R>(&mut self, repo: &R) -> Result<(), LoadError>
    where
        R: Repository + ?Sized,
    {
        *self = Self::load(repo)?;
        Ok(())
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
    pub fn match_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == match_id)
    }
}
