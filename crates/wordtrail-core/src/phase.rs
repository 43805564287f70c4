//! Session phases.

use serde::Serialize;

use crate::progression::QuizOutcome;

/// Where the session state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Reading dialog.
    Dialog,
    /// A quiz has been requested and is about to start.
    QuizEntering,
    /// Answering questions.
    QuizActive,
    /// On the success or failure screen.
    QuizResolved(QuizOutcome),
    /// Viewing the score summary of a passed quiz.
    Summary,
    /// The story has ended.
    Complete,
}

impl SessionPhase {
    /// Stable name used in logs and errors.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::QuizEntering => "quiz_entering",
            Self::QuizActive => "quiz_active",
            Self::QuizResolved(QuizOutcome::Success) => "quiz_resolved_success",
            Self::QuizResolved(QuizOutcome::Failure) => "quiz_resolved_failure",
            Self::Summary => "summary",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
