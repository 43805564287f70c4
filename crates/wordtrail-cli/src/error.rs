//! Wordtrail CLI — error types and wire error codes.

use serde::Serialize;
use thiserror::Error;
use wordtrail_core::error::ProgressError;

use crate::command::ParseError;

/// Startup and I/O errors for the harness.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable or config file is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading commands or writing responses failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON line returned for a failed command.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub ok: bool,
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Set when a corrective checkpoint also failed to persist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_error: Option<String>,
}

/// A command that could not be carried out.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CommandError {
    /// Stable snake_case code for the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(ParseError::Unknown(_)) => "unknown_command",
            Self::Parse(ParseError::Usage(_)) => "invalid_arguments",
            Self::Progress(err) => progress_code(err),
            Self::Encode(_) => "encoding_failed",
        }
    }

    /// The error as a response line.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            ok: false,
            error: self.code(),
            message: self.to_string(),
            write_error: match self {
                Self::Progress(err) => err.write_error().map(ToString::to_string),
                Self::Parse(_) | Self::Encode(_) => None,
            },
        }
    }
}

/// Maps a session error to its wire code.
#[must_use]
pub fn progress_code(err: &ProgressError) -> &'static str {
    match err {
        ProgressError::ContentNotFound { .. } => "content_not_found",
        ProgressError::InvalidSlot { .. } => "invalid_slot",
        ProgressError::CorruptSave(_) => "corrupt_save",
        ProgressError::NoRetryTarget => "no_retry_target",
        ProgressError::StorageWriteFailed(_) => "storage_write_failed",
        ProgressError::ScriptExhausted { .. } => "script_exhausted",
        ProgressError::InvalidTransition { .. } => "invalid_transition",
        ProgressError::InvariantViolation(_) => "invariant_violation",
        ProgressError::CorrectionNotSaved { error, .. } => progress_code(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: ProgressError) -> &'static str {
        CommandError::from(err).code()
    }

    #[test]
    fn test_content_not_found_maps_to_code() {
        assert_eq!(
            code_of(ProgressError::challenge_not_found("schema_1", 2)),
            "content_not_found"
        );
    }

    #[test]
    fn test_invalid_transition_maps_to_code() {
        assert_eq!(
            code_of(ProgressError::InvalidTransition {
                phase: "dialog",
                event: "answer",
            }),
            "invalid_transition"
        );
    }

    #[test]
    fn test_slot_and_storage_errors_map_to_codes() {
        assert_eq!(
            code_of(ProgressError::InvalidSlot { index: 4, max: 2 }),
            "invalid_slot"
        );
        assert_eq!(
            code_of(ProgressError::StorageWriteFailed("disk full".into())),
            "storage_write_failed"
        );
        assert_eq!(code_of(ProgressError::NoRetryTarget), "no_retry_target");
    }

    #[test]
    fn test_parse_errors_map_to_codes() {
        let unknown = CommandError::from(ParseError::Unknown("jump".into()));
        let usage = CommandError::from(ParseError::Usage("load <index>"));

        assert_eq!(unknown.code(), "unknown_command");
        assert_eq!(usage.code(), "invalid_arguments");
    }

    #[test]
    fn test_error_body_carries_message() {
        let body = CommandError::from(ProgressError::NoRetryTarget).to_body();

        assert!(!body.ok);
        assert_eq!(body.error, "no_retry_target");
        assert!(!body.message.is_empty());
    }

    #[test]
    fn test_unsaved_correction_keeps_primary_code_and_reports_write_error() {
        let err = ProgressError::challenge_not_found("schema_1", 1)
            .with_write_error(Some(ProgressError::StorageWriteFailed("disk full".into())));

        let body = CommandError::from(err).to_body();

        assert_eq!(body.error, "content_not_found");
        assert_eq!(
            body.write_error.as_deref(),
            Some("checkpoint write failed: disk full")
        );
    }
}
