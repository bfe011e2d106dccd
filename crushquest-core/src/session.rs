//! Compatibility game session state machine.
//!
//! A [`GameSession`] walks one player through the questions of a single
//! [`Game`]: `Idle` → `AwaitingAnswer(0)` → … → `Complete`. Sessions are
//! ephemeral and owned by whichever screen launched them; nothing here is
//! persisted.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnswerMatching;
use crate::game::{Game, InteractionMode, Question};

/// Where a session currently is in its game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No game selected
    #[default]
    Idle,
    /// Waiting on the answer to question `index`
    AwaitingAnswer { index: usize },
    /// Every question answered
    Complete,
}

impl SessionState {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::AwaitingAnswer { .. })
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingAnswer { index } => write!(f, "awaiting answer {index}"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Operations that can be refused by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Submit,
    Cancel,
}

impl std::fmt::Display for SessionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit => write!(f, "submit an answer"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Errors raised by session transitions. None of them mutate the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: SessionAction,
        state: SessionState,
    },
    #[error("answer {answer:?} is not one of {options:?}")]
    InvalidAnswer {
        answer: String,
        options: Vec<String>,
    },
    #[error("game {game_id} has no questions")]
    EmptyGame { game_id: String },
    #[error("question {index} of game {game_id} offers fewer than two options")]
    UnanswerableQuestion { game_id: String, index: usize },
}

/// Result of an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Moved on to question `index`
    Advanced { index: usize },
    /// The last question was answered
    Completed,
}

/// `Question 2 of 5`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub number: usize,
    pub total: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Question {} of {}", self.number, self.total)
    }
}

/// Finished answer set handed off to match scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedGame {
    pub game_id: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GameSession {
    game: Option<Game>,
    state: SessionState,
    answers: Vec<String>,
    matching: AnswerMatching,
}

impl GameSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_matching(matching: AnswerMatching) -> Self {
        Self {
            matching,
            ..Self::default()
        }
    }

    /// Begin `game` at its first question, discarding any game in flight.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the session untouched, if the game has no
    /// questions or a choice question cannot be answered.
    pub fn start(&mut self, game: Game) -> Result<(), SessionError> {
        if game.questions.is_empty() {
            return Err(SessionError::EmptyGame { game_id: game.id });
        }
        if let Some(index) = game.first_unanswerable_question() {
            return Err(SessionError::UnanswerableQuestion {
                game_id: game.id,
                index,
            });
        }
        if self.state.is_active() {
            log::debug!(
                "discarding in-flight session after {} answers",
                self.answers.len()
            );
        }
        log::debug!("starting game {} ({} questions)", game.id, game.question_count());
        self.game = Some(game);
        self.answers.clear();
        self.state = SessionState::AwaitingAnswer { index: 0 };
        Ok(())
    }

    /// Record an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `AwaitingAnswer`
    /// and [`SessionError::InvalidAnswer`] for answers the question does not
    /// accept. The session is unchanged in both cases.
    pub fn submit_answer(&mut self, raw: &str) -> Result<SubmitOutcome, SessionError> {
        let (index, game) = match (self.state, self.game.as_ref()) {
            (SessionState::AwaitingAnswer { index }, Some(game)) => (index, game),
            (state, _) => {
                log::warn!("rejected answer while {state}");
                return Err(SessionError::InvalidTransition {
                    action: SessionAction::Submit,
                    state,
                });
            }
        };

        let answer = resolve_answer(game, index, raw, self.matching).inspect_err(|err| {
            log::warn!("rejected answer for {} question {index}: {err}", game.id);
        })?;
        let total = game.question_count();

        self.answers.push(answer);
        if index + 1 < total {
            self.state = SessionState::AwaitingAnswer { index: index + 1 };
            Ok(SubmitOutcome::Advanced { index: index + 1 })
        } else {
            self.state = SessionState::Complete;
            log::debug!("session complete with {} answers", self.answers.len());
            Ok(SubmitOutcome::Completed)
        }
    }

    /// Abandon the game. Collected answers are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] when already idle.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Idle {
            return Err(SessionError::InvalidTransition {
                action: SessionAction::Cancel,
                state: self.state,
            });
        }
        log::debug!("session cancelled while {}", self.state);
        self.reset();
        Ok(())
    }

    /// Hand off a finished answer set and return to `Idle`.
    ///
    /// Returns `None` (and leaves the session alone) unless `Complete`.
    pub fn take_completed(&mut self) -> Option<CompletedGame> {
        if self.state != SessionState::Complete {
            return None;
        }
        let game_id = self.game.take().map(|game| game.id)?;
        let answers = std::mem::take(&mut self.answers);
        self.state = SessionState::Idle;
        Some(CompletedGame { game_id, answers })
    }

    fn reset(&mut self) {
        self.game = None;
        self.answers.clear();
        self.state = SessionState::Idle;
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub const fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    #[must_use]
    pub const fn matching(&self) -> AnswerMatching {
        self.matching
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::AwaitingAnswer { index } => self.game.as_ref()?.question(index),
            _ => None,
        }
    }

    /// Options offered for the current question (empty for text games).
    #[must_use]
    pub fn current_options(&self) -> Vec<String> {
        match (self.state, self.game.as_ref()) {
            (SessionState::AwaitingAnswer { index }, Some(game)) => game.options_for(index),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        match (self.state, self.game.as_ref()) {
            (SessionState::AwaitingAnswer { index }, Some(game)) => Some(Progress {
                number: index + 1,
                total: game.question_count(),
            }),
            _ => None,
        }
    }
}

fn resolve_answer(
    game: &Game,
    index: usize,
    raw: &str,
    matching: AnswerMatching,
) -> Result<String, SessionError> {
    let answer = raw.trim();
    match game.mode {
        InteractionMode::Text if answer.is_empty() => Err(SessionError::InvalidAnswer {
            answer: raw.to_string(),
            options: Vec::new(),
        }),
        InteractionMode::Text => Ok(answer.to_string()),
        InteractionMode::Choice => {
            let options = game.options_for(index);
            match options
                .iter()
                .find(|option| matching.matches(option, answer))
            {
                Some(option) => Ok(option.clone()),
                None => Err(SessionError::InvalidAnswer {
                    answer: raw.to_string(),
                    options,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coffee_game() -> Game {
        Game::new(
            "game_x",
            "Mini This or That",
            InteractionMode::Choice,
            vec![Question::new("Coffee or Tea?"), Question::new("Beach or Mountain?")],
        )
    }

    fn truth_game() -> Game {
        Game::new(
            "game_t",
            "Truth",
            InteractionMode::Text,
            vec![Question::new("Ideal first date?")],
        )
    }

    #[test]
    fn walks_through_every_question() {
        let mut session = GameSession::new();
        session.start(coffee_game()).unwrap();
        assert_eq!(session.state(), SessionState::AwaitingAnswer { index: 0 });
        assert_eq!(session.progress().unwrap().to_string(), "Question 1 of 2");
        assert_eq!(session.current_options(), vec!["Coffee", "Tea"]);

        assert_eq!(
            session.submit_answer(" Tea ").unwrap(),
            SubmitOutcome::Advanced { index: 1 }
        );
        assert_eq!(session.answers(), ["Tea"]);
        assert_eq!(session.submit_answer("Beach").unwrap(), SubmitOutcome::Completed);
        assert_eq!(session.state(), SessionState::Complete);
        assert!(session.current_question().is_none());

        let done = session.take_completed().unwrap();
        assert_eq!(done.game_id, "game_x");
        assert_eq!(done.answers, vec!["Tea", "Beach"]);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.take_completed().is_none());
    }

    #[test]
    fn rejects_answers_outside_option_set() {
        let mut session = GameSession::new();
        session.start(coffee_game()).unwrap();

        let err = session.submit_answer("Water").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidAnswer {
                answer: "Water".to_string(),
                options: vec!["Coffee".to_string(), "Tea".to_string()],
            }
        );
        assert!(session.submit_answer("tea").is_err());
        assert_eq!(session.state(), SessionState::AwaitingAnswer { index: 0 });
        assert!(session.answers().is_empty());
    }

    #[test]
    fn case_insensitive_matching_records_canonical_label() {
        let mut session = GameSession::with_matching(AnswerMatching::CaseInsensitive);
        session.start(coffee_game()).unwrap();
        session.submit_answer("tea").unwrap();
        assert_eq!(session.answers(), ["Tea"]);
    }

    #[test]
    fn submit_rejected_when_idle_or_complete() {
        let mut session = GameSession::new();
        assert_eq!(
            session.submit_answer("Coffee").unwrap_err(),
            SessionError::InvalidTransition {
                action: SessionAction::Submit,
                state: SessionState::Idle,
            }
        );

        session.start(truth_game()).unwrap();
        session.submit_answer("Picnic").unwrap();
        let err = session.submit_answer("Again").unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                state: SessionState::Complete,
                ..
            }
        ));
        assert_eq!(session.answers(), ["Picnic"]);
    }

    #[test]
    fn text_games_reject_blank_answers() {
        let mut session = GameSession::new();
        session.start(truth_game()).unwrap();
        assert!(matches!(
            session.submit_answer("   "),
            Err(SessionError::InvalidAnswer { .. })
        ));
        assert!(session.current_options().is_empty());
        session.submit_answer("  Stargazing  ").unwrap();
        assert_eq!(session.answers(), ["Stargazing"]);
    }

    #[test]
    fn cancel_discards_answers_and_allows_restart() {
        let mut session = GameSession::new();
        assert!(session.cancel().is_err());

        session.start(coffee_game()).unwrap();
        session.submit_answer("Coffee").unwrap();
        session.cancel().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.answers().is_empty());
        assert!(session.game().is_none());

        session.start(coffee_game()).unwrap();
        assert_eq!(session.state(), SessionState::AwaitingAnswer { index: 0 });

        session.submit_answer("Coffee").unwrap();
        session.submit_answer("Beach").unwrap();
        session.cancel().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn starting_again_discards_in_flight_game() {
        let mut session = GameSession::new();
        session.start(coffee_game()).unwrap();
        session.submit_answer("Coffee").unwrap();
        session.start(truth_game()).unwrap();
        assert_eq!(session.state(), SessionState::AwaitingAnswer { index: 0 });
        assert!(session.answers().is_empty());
        assert_eq!(session.game().map(|g| g.id.as_str()), Some("game_t"));
    }

    #[test]
    fn refuses_games_that_cannot_be_played() {
        let mut session = GameSession::new();
        let empty = Game::new("empty", "Empty", InteractionMode::Choice, Vec::new());
        assert_eq!(
            session.start(empty).unwrap_err(),
            SessionError::EmptyGame {
                game_id: "empty".to_string()
            }
        );

        let unanswerable = Game::new(
            "odd",
            "Odd",
            InteractionMode::Choice,
            vec![Question::new("Favorite color?")],
        );
        assert!(matches!(
            session.start(unanswerable),
            Err(SessionError::UnanswerableQuestion { index: 0, .. })
        ));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn padded_option_labels_can_still_be_answered() {
        let padded = Game::new(
            "game_pad",
            "Padded",
            InteractionMode::Choice,
            vec![Question::with_options("Coffee or Tea?", [" Coffee ", "Tea"])],
        );
        let mut session = GameSession::new();
        assert_eq!(session.matching(), AnswerMatching::Exact);
        session.start(padded).unwrap();
        assert_eq!(session.current_options(), vec!["Coffee", "Tea"]);
        assert_eq!(
            session.submit_answer(" Coffee ").unwrap(),
            SubmitOutcome::Completed
        );
        assert_eq!(session.answers(), ["Coffee"]);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = SessionError::InvalidTransition {
            action: SessionAction::Cancel,
            state: SessionState::Idle,
        };
        assert_eq!(err.to_string(), "cannot cancel while idle");
    }
}
