//! Progression error types.

use thiserror::Error;

/// Top-level error type shared by the session, quiz, store and content
/// layers. Every variant is recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// The content repository could not resolve a schema or challenge.
    #[error("content not found: schema {schema}{}", challenge_suffix(.challenge_index))]
    ContentNotFound {
        /// The schema that was requested.
        schema: String,
        /// The 1-based challenge index, when a quiz was requested.
        challenge_index: Option<u32>,
    },

    /// A manual save slot index outside `[1, len + 1]`.
    #[error("invalid save slot {index}: expected 1..={max}")]
    InvalidSlot {
        /// The rejected slot index.
        index: usize,
        /// The highest index that would have been accepted.
        max: usize,
    },

    /// A persisted record could not be parsed.
    #[error("corrupt save data: {0}")]
    CorruptSave(String),

    /// Retry was requested before any quiz was attempted.
    #[error("no quiz has been attempted this session")]
    NoRetryTarget,

    /// A durable write failed. In-memory state has still advanced.
    #[error("checkpoint write failed: {0}")]
    StorageWriteFailed(String),

    /// The dialog script has no line at the cursor and no fallback applies.
    #[error("dialog script {schema} has no line at index {cursor}")]
    ScriptExhausted {
        /// The exhausted schema.
        schema: String,
        /// The cursor that ran past the end.
        cursor: usize,
    },

    /// The event is not accepted in the current phase. No state changed.
    #[error("{event} is not valid while {phase}")]
    InvalidTransition {
        /// Name of the current phase.
        phase: &'static str,
        /// Name of the rejected event.
        event: &'static str,
    },

    /// A progression invariant was broken. Indicates a programming error.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The operation failed and the session corrected itself, but the
    /// corrective checkpoint did not reach storage.
    #[error("{error}; corrective checkpoint not saved: {write_error}")]
    CorrectionNotSaved {
        /// Why the operation failed.
        error: Box<ProgressError>,
        /// Why the corrective checkpoint failed.
        write_error: Box<ProgressError>,
    },
}

impl ProgressError {
    /// Shorthand for a missing quiz challenge.
    #[must_use]
    pub fn challenge_not_found(schema: &str, challenge_index: u32) -> Self {
        Self::ContentNotFound {
            schema: schema.to_owned(),
            challenge_index: Some(challenge_index),
        }
    }

    /// Attaches the failure of a corrective checkpoint, if there was one.
    #[must_use]
    pub fn with_write_error(self, write_error: Option<ProgressError>) -> Self {
        match write_error {
            Some(write_error) => Self::CorrectionNotSaved {
                error: Box::new(self),
                write_error: Box::new(write_error),
            },
            None => self,
        }
    }

    /// The error that made the operation fail, without any attached write
    /// failure.
    #[must_use]
    pub fn primary(&self) -> &ProgressError {
        match self {
            Self::CorrectionNotSaved { error, .. } => error.primary(),
            other => other,
        }
    }

    /// The failed corrective write, if one is attached.
    #[must_use]
    pub fn write_error(&self) -> Option<&ProgressError> {
        match self {
            Self::CorrectionNotSaved { write_error, .. } => Some(write_error),
            _ => None,
        }
    }

    /// Shorthand for a missing dialog script.
    #[must_use]
    pub fn dialog_not_found(schema: &str) -> Self {
        Self::ContentNotFound {
            schema: schema.to_owned(),
            challenge_index: None,
        }
    }
}

#[allow(clippy::ref_option)]
fn challenge_suffix(challenge_index: &Option<u32>) -> String {
    challenge_index.map_or_else(String::new, |i| format!(" challenge {i}"))
}
