//! Durable storage seam for the auto-save and manual save slots.

use crate::error::ProgressError;
use crate::save::{SaveRecord, SaveSlot};

/// Durable storage for progression records.
///
/// Implementations serialize writes per target (auto-save, slot list) and
/// never leave a half-written record behind.
pub trait SaveStore: Send + Sync {
    /// Loads the auto-save. Missing or unreadable data is reported as `None`.
    fn load_auto_save(&self) -> Option<SaveRecord>;

    /// Atomically replaces the auto-save.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageWriteFailed` if the record could not be
    /// written; the previous auto-save is left intact.
    fn write_auto_save(&self, record: &SaveRecord) -> Result<(), ProgressError>;

    /// Returns all manual slots in index order.
    fn list_slots(&self) -> Vec<SaveSlot>;

    /// Appends (`index == len + 1`) or overwrites (`1 <= index <= len`) a slot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidSlot` for any other index, or
    /// `ProgressError::StorageWriteFailed` if the slot list could not be
    /// written.
    fn upsert_slot(&self, index: usize, record: &SaveRecord) -> Result<(), ProgressError>;

    /// Removes a slot and compacts the indices after it. Unknown indices are
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageWriteFailed` if the slot list could not
    /// be written.
    fn delete_slot(&self, index: usize) -> Result<(), ProgressError>;

    /// Deletes the auto-save and every slot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageWriteFailed` if stored data could not
    /// be removed.
    fn reset_all(&self) -> Result<(), ProgressError>;

    /// Returns the slot at a 1-based index.
    fn load_slot(&self, index: usize) -> Option<SaveSlot> {
        self.list_slots().into_iter().find(|slot| slot.index == index)
    }

    /// Returns `true` if the auto-save holds resumable progress.
    fn has_continue_data(&self) -> bool {
        self.load_auto_save().is_some_and(|record| !record.is_empty())
    }
}
