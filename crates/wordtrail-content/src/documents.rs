//! On-disk document layouts and their conversion into the content model.

use serde::Deserialize;
use thiserror::Error;
use wordtrail_core::content::{Challenge, DialogEvent, DialogLine, DialogScript, Question};

/// A document that parsed but does not describe valid content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The line names an event this build does not know.
    #[error("line {line}: unknown event \"{event}\"")]
    UnknownEvent { line: usize, event: String },

    /// A `next_schema` event without a target.
    #[error("line {line}: next_schema event without next_schema")]
    MissingNextSchema { line: usize },
}

/// A dialog scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDocument {
    /// Schema the scene was authored for; the file name wins if they differ.
    #[serde(default)]
    pub schema: Option<String>,
    /// Background asset.
    #[serde(default)]
    pub background: Option<String>,
    /// Lines in playback order.
    #[serde(default)]
    pub dialog: Vec<LineDocument>,
}

/// One dialog line in a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct LineDocument {
    pub speaker: String,
    pub text: String,
    #[serde(default)]
    pub expression: Option<String>,
    /// `quiz`, `next_schema` or `game_complete`.
    #[serde(default)]
    pub event: Option<String>,
    /// Schema of the quiz; defaults to the scene's own schema.
    #[serde(default)]
    pub quiz_schema: Option<String>,
    /// 1-based challenge index; defaults to 1.
    #[serde(default)]
    pub quiz_index: Option<u32>,
    #[serde(default)]
    pub next_schema: Option<String>,
}

/// A challenge set file.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeSetDocument {
    #[serde(default)]
    pub challenges: Vec<ChallengeDocument>,
}

/// One challenge in a challenge set file.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeDocument {
    /// Level label such as `level_2`; its digits become the level.
    #[serde(default)]
    pub verb_level: String,
    #[serde(default)]
    pub background_asset: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDocument>,
}

/// One question in a challenge set file.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDocument {
    pub context: String,
    pub answer: String,
    pub missing_letters: Vec<String>,
    pub scrambled_word: String,
    pub time_limit_seconds: f64,
}

impl SceneDocument {
    /// Converts the scene into the dialog script for `schema`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if a line carries an unknown or incomplete
    /// event.
    pub fn into_script(self, schema: &str) -> Result<DialogScript, DocumentError> {
        let lines = self
            .dialog
            .into_iter()
            .enumerate()
            .map(|(i, line)| line.into_line(i, schema))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DialogScript {
            schema: schema.to_owned(),
            background: self.background.filter(|b| !b.is_empty()),
            lines,
        })
    }
}

impl LineDocument {
    fn into_line(self, index: usize, scene_schema: &str) -> Result<DialogLine, DocumentError> {
        let event = match self.event.as_deref().map(str::trim) {
            None | Some("") => None,
            Some("quiz") => Some(DialogEvent::Quiz {
                schema: self
                    .quiz_schema
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| scene_schema.to_owned()),
                challenge_index: self.quiz_index.unwrap_or(1),
            }),
            Some("next_schema") => Some(DialogEvent::NextSchema {
                schema: self
                    .next_schema
                    .filter(|s| !s.is_empty())
                    .ok_or(DocumentError::MissingNextSchema { line: index })?,
            }),
            Some("game_complete" | "end") => Some(DialogEvent::GameComplete),
            Some(other) => {
                return Err(DocumentError::UnknownEvent {
                    line: index,
                    event: other.to_owned(),
                });
            }
        };
        Ok(DialogLine {
            speaker: self.speaker,
            text: self.text,
            expression: self.expression.filter(|e| !e.is_empty()),
            event,
        })
    }
}

impl ChallengeSetDocument {
    /// Converts the set into challenges, in 1-based index order.
    #[must_use]
    pub fn into_challenges(self) -> Vec<Challenge> {
        self.challenges
            .into_iter()
            .map(ChallengeDocument::into_challenge)
            .collect()
    }
}

impl ChallengeDocument {
    fn into_challenge(self) -> Challenge {
        Challenge {
            level: parse_level(&self.verb_level),
            background: self.background_asset.filter(|b| !b.is_empty()),
            questions: self
                .questions
                .into_iter()
                .map(|q| Question {
                    prompt: q.context,
                    answer: q.answer,
                    expected_glyphs: q.missing_letters,
                    scrambled_presentation: q.scrambled_word,
                    time_limit_seconds: q.time_limit_seconds,
                })
                .collect(),
        }
    }
}

/// Digits of a level label; labels without digits are level 1.
fn parse_level(label: &str) -> u32 {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(1)
}
