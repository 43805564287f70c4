//! In-memory model of where the player currently is.

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// How a quiz attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizOutcome {
    /// Every question answered before health ran out.
    Success,
    /// Health reached zero.
    Failure,
}

impl QuizOutcome {
    /// Stable name used in logs and phase labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Final figures of a resolved quiz attempt, kept for the result screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Success or failure.
    pub outcome: QuizOutcome,
    /// Health left when the attempt ended.
    pub health: u8,
    /// Unpaused seconds spent in the attempt.
    pub elapsed_seconds: f64,
}

/// A quiz the player has been sent to by the narrative, or has just
/// resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQuiz {
    /// Schema whose challenge set holds the quiz.
    pub schema: String,
    /// 1-based challenge index within the schema's challenge set.
    pub challenge_index: u32,
    /// Dialog cursor to continue from once the quiz is passed.
    pub resume_cursor: usize,
    /// Schema that `resume_cursor` points into. Absent in older saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_schema: Option<String>,
    /// Set once the attempt has resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<QuizResult>,
}

impl PendingQuiz {
    /// Creates an unresolved pending quiz.
    #[must_use]
    pub fn new(schema: impl Into<String>, challenge_index: u32, resume_cursor: usize) -> Self {
        Self {
            schema: schema.into(),
            challenge_index,
            resume_cursor,
            dialog_schema: None,
            result: None,
        }
    }

    /// Records the schema `resume_cursor` points into.
    #[must_use]
    pub fn in_dialog(mut self, schema: impl Into<String>) -> Self {
        self.dialog_schema = Some(schema.into());
        self
    }

    /// Returns `true` if continuing after this quiz should move the cursor of
    /// `active_schema` to `resume_cursor`. Older saves without a dialog
    /// schema resume in whatever schema is active.
    #[must_use]
    pub fn resumes_in(&self, active_schema: &str) -> bool {
        self.dialog_schema
            .as_deref()
            .is_none_or(|schema| schema == active_schema)
    }

    /// Returns `true` if this refers to the given quiz.
    #[must_use]
    pub fn is_quiz(&self, schema: &str, challenge_index: u32) -> bool {
        self.schema == schema && self.challenge_index == challenge_index
    }

    /// Returns a copy with the result cleared, ready for another attempt.
    #[must_use]
    pub fn reopened(&self) -> Self {
        Self {
            result: None,
            ..self.clone()
        }
    }
}

/// State of a quiz attempt in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    /// 1-based challenge index being played.
    pub challenge_index: u32,
    /// 0-based index of the current question.
    pub question_index: usize,
    /// Remaining hearts.
    pub health: u8,
    /// Unpaused seconds spent so far.
    pub elapsed_seconds: f64,
}

impl QuizAttempt {
    /// A fresh attempt at full health on the first question.
    #[must_use]
    pub fn fresh(challenge_index: u32, max_health: u8) -> Self {
        Self {
            challenge_index,
            question_index: 0,
            health: max_health,
            elapsed_seconds: 0.0,
        }
    }
}

/// The mutually exclusive positions a player can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Reading dialog.
    Dialog,
    /// A quiz is pending: about to be entered, or resolved and awaiting the
    /// player's next step.
    QuizPending,
    /// Inside a quiz attempt.
    InQuiz,
}

/// Single source of truth for the player's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    /// Current narrative unit.
    pub active_schema: String,
    /// Index of the next unseen dialog line in `active_schema`.
    pub dialog_cursor: usize,
    /// Quiz triggered by the narrative, if any.
    pub pending_quiz: Option<PendingQuiz>,
    /// Attempt in progress, if any.
    pub quiz_attempt: Option<QuizAttempt>,
    /// Highest challenge index finished successfully.
    pub last_completed_quiz_index: u32,
    /// Set once the story has reached its end.
    pub game_complete: bool,
    /// When this state was last durably written (RFC 3339), empty if never.
    pub checkpoint_timestamp: String,
}

impl ProgressionState {
    /// State at the very beginning of a new game.
    #[must_use]
    pub fn new_game(schema: impl Into<String>) -> Self {
        Self {
            active_schema: schema.into(),
            dialog_cursor: 0,
            pending_quiz: None,
            quiz_attempt: None,
            last_completed_quiz_index: 0,
            game_complete: false,
            checkpoint_timestamp: String::new(),
        }
    }

    /// Derives the player's position.
    #[must_use]
    pub fn position(&self) -> Position {
        match (&self.pending_quiz, &self.quiz_attempt) {
            (_, Some(_)) => Position::InQuiz,
            (Some(_), None) => Position::QuizPending,
            (None, None) => Position::Dialog,
        }
    }

    /// Moves to the start of another narrative unit.
    pub fn enter_schema(&mut self, schema: impl Into<String>) {
        self.active_schema = schema.into();
        self.dialog_cursor = 0;
    }

    /// Records a passed challenge; the stored index never decreases.
    pub fn record_completion(&mut self, challenge_index: u32) {
        self.last_completed_quiz_index = self.last_completed_quiz_index.max(challenge_index);
    }

    /// Checks the structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvariantViolation` describing the first
    /// broken invariant.
    pub fn validate(&self, max_health: u8) -> Result<(), ProgressError> {
        if let Some(attempt) = &self.quiz_attempt {
            let Some(pending) = &self.pending_quiz else {
                return Err(ProgressError::InvariantViolation(
                    "quiz attempt without a pending quiz".to_owned(),
                ));
            };
            if pending.challenge_index != attempt.challenge_index {
                return Err(ProgressError::InvariantViolation(format!(
                    "attempt challenge {} does not match pending challenge {}",
                    attempt.challenge_index, pending.challenge_index
                )));
            }
            if pending.result.is_some() {
                return Err(ProgressError::InvariantViolation(
                    "quiz attempt on an already resolved quiz".to_owned(),
                ));
            }
            if attempt.health == 0 || attempt.health > max_health {
                return Err(ProgressError::InvariantViolation(format!(
                    "attempt health {} outside 1..={max_health}",
                    attempt.health
                )));
            }
        }
        if self.game_complete && self.pending_quiz.is_some() {
            return Err(ProgressError::InvariantViolation(
                "completed game with a pending quiz".to_owned(),
            ));
        }
        Ok(())
    }
}
