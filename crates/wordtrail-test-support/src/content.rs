//! In-memory `ContentRepository` for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use wordtrail_core::content::{Challenge, ContentRepository, DialogScript};
use wordtrail_core::error::ProgressError;

/// A content repository backed by hash maps. Content can be removed while a
/// session is running to simulate stale saves.
#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    dialogs: Mutex<HashMap<String, DialogScript>>,
    challenges: Mutex<HashMap<String, Vec<Challenge>>>,
}

impl InMemoryContentRepository {
    /// An empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dialog script under its own schema.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_dialog(self, script: DialogScript) -> Self {
        self.dialogs
            .lock()
            .unwrap()
            .insert(script.schema.clone(), script);
        self
    }

    /// Adds a challenge set for `schema`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_challenges(self, schema: &str, challenges: Vec<Challenge>) -> Self {
        self.challenges
            .lock()
            .unwrap()
            .insert(schema.to_owned(), challenges);
        self
    }

    /// Removes the challenge set for `schema`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn remove_challenges(&self, schema: &str) {
        self.challenges.lock().unwrap().remove(schema);
    }

    /// Removes the dialog script for `schema`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn remove_dialog(&self, schema: &str) {
        self.dialogs.lock().unwrap().remove(schema);
    }
}

impl ContentRepository for InMemoryContentRepository {
    fn resolve_dialog(&self, schema: &str) -> Result<DialogScript, ProgressError> {
        self.dialogs
            .lock()
            .unwrap()
            .get(schema)
            .cloned()
            .ok_or_else(|| ProgressError::dialog_not_found(schema))
    }

    fn resolve_challenges(&self, schema: &str) -> Result<Vec<Challenge>, ProgressError> {
        self.challenges
            .lock()
            .unwrap()
            .get(schema)
            .cloned()
            .ok_or_else(|| ProgressError::ContentNotFound {
                schema: schema.to_owned(),
                challenge_index: None,
            })
    }
}
