//! Narrative and quiz content model, and the repository seam that resolves
//! it by schema.

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// Side effect attached to a dialog line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogEvent {
    /// Send the player to a quiz.
    Quiz {
        /// Schema whose challenge set holds the quiz.
        schema: String,
        /// 1-based challenge index.
        challenge_index: u32,
    },
    /// Continue in another narrative unit.
    NextSchema {
        /// The schema to enter.
        schema: String,
    },
    /// The story ends here.
    GameComplete,
}

/// One line of scripted dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogLine {
    /// Name of the speaking character.
    pub speaker: String,
    /// What they say.
    pub text: String,
    /// Portrait expression, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// What happens after the line is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<DialogEvent>,
}

impl DialogLine {
    /// A line with no expression and no event.
    #[must_use]
    pub fn plain(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            expression: None,
            event: None,
        }
    }

    /// Attaches an event to the line.
    #[must_use]
    pub fn with_event(mut self, event: DialogEvent) -> Self {
        self.event = Some(event);
        self
    }
}

/// The ordered lines of one narrative unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogScript {
    /// Schema this script belongs to.
    pub schema: String,
    /// Background asset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Lines in playback order.
    pub lines: Vec<DialogLine>,
}

impl DialogScript {
    /// Returns the line at `cursor`, if the script has one.
    #[must_use]
    pub fn line(&self, cursor: usize) -> Option<&DialogLine> {
        self.lines.get(cursor)
    }
}

/// A single fill-in-the-letters question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Sentence giving the word its context.
    pub prompt: String,
    /// The full answer word.
    pub answer: String,
    /// Letters the player must place, in order.
    pub expected_glyphs: Vec<String>,
    /// The word as shown, with `_` marking each blank.
    pub scrambled_presentation: String,
    /// Seconds allowed for the question.
    pub time_limit_seconds: f64,
}

impl Question {
    /// Number of blanks the player must fill.
    #[must_use]
    pub fn blank_count(&self) -> usize {
        self.scrambled_presentation
            .chars()
            .filter(|c| *c == '_')
            .count()
    }
}

/// An ordered sequence of questions sharing a background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Difficulty level.
    pub level: u32,
    /// Background asset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Questions in play order.
    pub questions: Vec<Question>,
}

/// Resolves dialog scripts and challenge sets by schema.
///
/// Implementations are read-only from the session's point of view and may
/// cache.
pub trait ContentRepository: Send + Sync {
    /// Loads the dialog script for `schema`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ContentNotFound` if no script exists.
    fn resolve_dialog(&self, schema: &str) -> Result<DialogScript, ProgressError>;

    /// Loads the challenge set for `schema`, in 1-based challenge order.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ContentNotFound` if no challenge set exists.
    fn resolve_challenges(&self, schema: &str) -> Result<Vec<Challenge>, ProgressError>;

    /// Loads one challenge by its 1-based index. Challenges without
    /// questions are treated as missing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ContentNotFound` if the index is out of range.
    fn resolve_challenge(
        &self,
        schema: &str,
        challenge_index: u32,
    ) -> Result<Challenge, ProgressError> {
        let challenges = self.resolve_challenges(schema)?;
        challenge_index
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| challenges.into_iter().nth(i))
            .filter(|c| !c.questions.is_empty())
            .ok_or_else(|| ProgressError::challenge_not_found(schema, challenge_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneChallenge;

    impl ContentRepository for OneChallenge {
        fn resolve_dialog(&self, schema: &str) -> Result<DialogScript, ProgressError> {
            Err(ProgressError::dialog_not_found(schema))
        }

        fn resolve_challenges(&self, _schema: &str) -> Result<Vec<Challenge>, ProgressError> {
            Ok(vec![
                Challenge {
                    level: 1,
                    background: None,
                    questions: vec![Question {
                        prompt: "The cat ___ on the mat.".to_owned(),
                        answer: "sat".to_owned(),
                        expected_glyphs: vec!["s".to_owned(), "a".to_owned()],
                        scrambled_presentation: "__t".to_owned(),
                        time_limit_seconds: 30.0,
                    }],
                },
                Challenge {
                    level: 2,
                    background: None,
                    questions: Vec::new(),
                },
            ])
        }
    }

    #[test]
    fn test_resolve_challenge_is_one_based() {
        let challenge = OneChallenge.resolve_challenge("schema_1", 1).unwrap();

        assert_eq!(challenge.level, 1);
        assert_eq!(challenge.questions[0].blank_count(), 2);
    }

    #[test]
    fn test_resolve_challenge_rejects_zero_and_out_of_range() {
        for index in [0, 3] {
            let err = OneChallenge.resolve_challenge("schema_1", index).unwrap_err();
            assert_eq!(err, ProgressError::challenge_not_found("schema_1", index));
        }
    }

    #[test]
    fn test_resolve_challenge_treats_empty_challenge_as_missing() {
        let result = OneChallenge.resolve_challenge("schema_1", 2);

        assert!(matches!(result, Err(ProgressError::ContentNotFound { .. })));
    }

    #[test]
    fn test_dialog_event_serializes_with_type_tag() {
        let line = DialogLine::plain("Rani", "Let's go.").with_event(DialogEvent::Quiz {
            schema: "schema_1".to_owned(),
            challenge_index: 2,
        });

        let value = serde_json::to_value(&line).unwrap();

        assert_eq!(value["event"]["type"], "quiz");
        assert_eq!(value["event"]["challenge_index"], 2);
        assert!(value.get("expression").is_none());
    }
}
