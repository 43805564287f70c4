//! Results of session transitions.

use serde::Serialize;
use wordtrail_core::content::DialogLine;
use wordtrail_core::error::ProgressError;
use wordtrail_core::progression::PendingQuiz;

/// What a dialog advance produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextContent {
    /// A plain line to show.
    Line {
        /// The line.
        line: DialogLine,
    },
    /// A line that sends the player to a quiz.
    QuizRequested {
        /// The triggering line.
        line: DialogLine,
        /// The quiz to enter.
        quiz: PendingQuiz,
    },
    /// The narrative moved to another schema.
    SchemaTransition {
        /// The line that caused the move; `None` when the script ran out and
        /// the configured fallback schema was entered.
        line: Option<DialogLine>,
        /// The schema now active.
        schema: String,
    },
    /// The story ended.
    GameComplete {
        /// The final line.
        line: DialogLine,
    },
}

/// A transition result together with the outcome of its durable write.
///
/// The in-memory state has advanced either way; `write_error` tells the
/// caller the checkpoint did not persist so it can `flush` or warn.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpointed<T> {
    /// The transition result.
    pub value: T,
    /// Set when the checkpoint write failed.
    pub write_error: Option<ProgressError>,
}

impl<T> Checkpointed<T> {
    /// Wraps a value whose checkpoint was written (or not needed).
    #[must_use]
    pub fn persisted(value: T) -> Self {
        Self {
            value,
            write_error: None,
        }
    }

    /// Wraps a value with the outcome of its write.
    #[must_use]
    pub fn new(value: T, write_error: Option<ProgressError>) -> Self {
        Self { value, write_error }
    }

    /// Returns `true` if the checkpoint reached durable storage.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.write_error.is_none()
    }

    /// Transforms the value, keeping the write outcome.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checkpointed<U> {
        Checkpointed {
            value: f(self.value),
            write_error: self.write_error,
        }
    }

    /// Treats a failed write as an error.
    ///
    /// # Errors
    ///
    /// Returns the `StorageWriteFailed` error if the checkpoint did not
    /// persist.
    pub fn into_result(self) -> Result<T, ProgressError> {
        match self.write_error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result_surfaces_write_failure() {
        let ok = Checkpointed::persisted(3);
        let failed = Checkpointed::new(
            3,
            Some(ProgressError::StorageWriteFailed("disk full".to_owned())),
        );

        assert_eq!(ok.into_result(), Ok(3));
        assert!(matches!(
            failed.into_result(),
            Err(ProgressError::StorageWriteFailed(_))
        ));
    }

    #[test]
    fn test_next_content_serializes_with_kind_tag() {
        let next = NextContent::SchemaTransition {
            line: None,
            schema: "schema_2".to_owned(),
        };

        let value = serde_json::to_value(&next).unwrap();

        assert_eq!(value["kind"], "schema_transition");
        assert_eq!(value["schema"], "schema_2");
    }
}
