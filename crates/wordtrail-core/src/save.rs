//! Persisted forms of the progression state.

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;
use crate::progression::{PendingQuiz, ProgressionState, QuizAttempt};

/// Current record layout version.
pub const SAVE_FORMAT_VERSION: u32 = 1;

fn current_version() -> u32 {
    SAVE_FORMAT_VERSION
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Flattened, versioned snapshot of a `ProgressionState`.
///
/// Only `schema` is required on read; older records that carry just
/// `schema`, `dialogIndex`, `lastCompletedQuizIndex` and a `lastPlayTime` or
/// `dateSaved` stamp load with the remaining fields defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    /// Record layout version.
    #[serde(default = "current_version")]
    pub version: u32,
    /// Free-text label chosen by the player.
    #[serde(default)]
    pub info: String,
    /// When the record was written.
    #[serde(default, alias = "lastPlayTime", alias = "dateSaved")]
    pub saved_at: String,
    /// Active narrative schema.
    pub schema: String,
    /// Next unseen dialog line.
    #[serde(default)]
    pub dialog_index: usize,
    /// Highest challenge index finished successfully.
    #[serde(default)]
    pub last_completed_quiz_index: u32,
    /// Quiz the narrative has sent the player to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_quiz: Option<PendingQuiz>,
    /// Attempt in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_attempt: Option<QuizAttempt>,
    /// Set once the story has ended.
    #[serde(default, skip_serializing_if = "is_false")]
    pub game_complete: bool,
}

impl SaveRecord {
    /// Captures `state` as a record stamped with `saved_at`.
    #[must_use]
    pub fn capture(state: &ProgressionState, info: impl Into<String>, saved_at: String) -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            info: info.into(),
            saved_at,
            schema: state.active_schema.clone(),
            dialog_index: state.dialog_cursor,
            last_completed_quiz_index: state.last_completed_quiz_index,
            pending_quiz: state.pending_quiz.clone(),
            quiz_attempt: state.quiz_attempt.clone(),
            game_complete: state.game_complete,
        }
    }

    /// Rebuilds the in-memory state. The checkpoint timestamp is the record's
    /// `saved_at`.
    #[must_use]
    pub fn to_state(&self) -> ProgressionState {
        ProgressionState {
            active_schema: self.schema.clone(),
            dialog_cursor: self.dialog_index,
            pending_quiz: self.pending_quiz.clone(),
            quiz_attempt: self.quiz_attempt.clone(),
            last_completed_quiz_index: self.last_completed_quiz_index,
            game_complete: self.game_complete,
            checkpoint_timestamp: self.saved_at.clone(),
        }
    }

    /// A record without a schema carries no resumable progress.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }
}

/// A manual save slot: a record plus its 1-based position in the slot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSlot {
    /// 1-based, contiguous slot index.
    pub index: usize,
    /// The saved progress.
    #[serde(flatten)]
    pub record: SaveRecord,
}

/// Ordered list of manual save slots.
///
/// Indices are always `1..=len` with no gaps; every store delegates its slot
/// bookkeeping here so the rules are identical across backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotList {
    /// Slots in insertion order.
    #[serde(default)]
    pub list: Vec<SaveSlot>,
}

impl SlotList {
    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Looks up a slot by its 1-based index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SaveSlot> {
        index.checked_sub(1).and_then(|i| self.list.get(i))
    }

    /// Appends when `index == len + 1`, overwrites when `1 <= index <= len`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidSlot` for any other index, leaving the
    /// list unchanged.
    pub fn upsert(&mut self, index: usize, record: SaveRecord) -> Result<(), ProgressError> {
        let max = self.list.len() + 1;
        if index == 0 || index > max {
            return Err(ProgressError::InvalidSlot { index, max });
        }
        let slot = SaveSlot { index, record };
        if index == max {
            self.list.push(slot);
        } else {
            self.list[index - 1] = slot;
        }
        Ok(())
    }

    /// Removes a slot and re-numbers the ones after it. Returns `false` if
    /// there was no such slot.
    pub fn delete(&mut self, index: usize) -> bool {
        if index == 0 || index > self.list.len() {
            return false;
        }
        self.list.remove(index - 1);
        self.renumber();
        true
    }

    /// Restores contiguous 1-based indices, e.g. after loading a list that
    /// was edited by hand.
    pub fn renumber(&mut self) {
        for (i, slot) in self.list.iter_mut().enumerate() {
            slot.index = i + 1;
        }
    }
}
