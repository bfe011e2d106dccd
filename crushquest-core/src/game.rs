//! Compatibility game definitions
use serde::{Deserialize, Serialize};

/// Delimiter word used by legacy choice prompts such as `"Coffee or Tea?"`.
const CHOICE_DELIMITER: &str = " or ";

/// How a player answers the questions of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Pick one of a fixed set of options per question
    #[default]
    Choice,
    /// Free-form text answers
    Text,
}

impl InteractionMode {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A single prompt within a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "q")]
    pub prompt: String,
    /// Explicit ordered option labels. Choice questions without them fall
    /// back to [`derive_choice_options`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Question {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: None,
        }
    }

    #[must_use]
    pub fn with_options<I, S>(prompt: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            options: Some(options.into_iter().map(Into::into).collect()),
        }
    }

    /// Options a choice-mode player may pick for this question. Explicit
    /// labels are trimmed and blank ones dropped, matching how answers are
    /// trimmed before comparison.
    #[must_use]
    pub fn choice_options(&self) -> Vec<String> {
        match &self.options {
            Some(options) => options
                .iter()
                .map(|option| option.trim())
                .filter(|option| !option.is_empty())
                .map(str::to_string)
                .collect(),
            None => derive_choice_options(&self.prompt),
        }
    }
}

/// A named, ordered sequence of compatibility questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "game_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub mode: InteractionMode,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Game {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mode: InteractionMode,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode,
            questions,
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Options for the question at `index`. Text-mode games have none.
    #[must_use]
    pub fn options_for(&self, index: usize) -> Vec<String> {
        match (self.mode, self.question(index)) {
            (InteractionMode::Choice, Some(question)) => question.choice_options(),
            _ => Vec::new(),
        }
    }

    /// Index of the first choice question offering fewer than two options.
    #[must_use]
    pub fn first_unanswerable_question(&self) -> Option<usize> {
        if self.mode != InteractionMode::Choice {
            return None;
        }
        self.questions
            .iter()
            .position(|question| question.choice_options().len() < 2)
    }

    /// Short catalogue line, e.g. `5 questions • choice`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} questions • {}", self.question_count(), self.mode)
    }
}

/// Split a legacy choice prompt into its options.
///
/// `"Early Bird or Night Owl?"` yields `["Early Bird", "Night Owl"]`. The rule
/// depends on the prompt being phrased with a literal ` or ` and is only used
/// for questions that carry no explicit options. A prompt without the
/// delimiter yields no options.
#[must_use]
pub fn derive_choice_options(prompt: &str) -> Vec<String> {
    if !prompt.contains(CHOICE_DELIMITER) {
        return Vec::new();
    }
    prompt
        .split(CHOICE_DELIMITER)
        .map(|option| option.trim().trim_end_matches('?').trim())
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect()
}
