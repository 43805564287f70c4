//! Test save store — records every durable write.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use wordtrail_core::error::ProgressError;
use wordtrail_core::save::{SaveRecord, SaveSlot, SlotList};
use wordtrail_core::store::SaveStore;

/// An in-memory save store that keeps a log of every auto-save write. Writes
/// can be made to fail to exercise the storage-failure paths.
#[derive(Debug, Default)]
pub struct RecordingSaveStore {
    auto_save: Mutex<Option<SaveRecord>>,
    slots: Mutex<SlotList>,
    writes: Mutex<Vec<SaveRecord>>,
    failing: AtomicBool,
}

impl RecordingSaveStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose auto-save already holds `record`.
    #[must_use]
    pub fn with_auto_save(record: SaveRecord) -> Self {
        let store = Self::default();
        *store.auto_save.lock().unwrap() = Some(record);
        store
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a snapshot of all successful auto-save writes, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn auto_save_writes(&self) -> Vec<SaveRecord> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of successful auto-save writes.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Forgets the write log, keeping the stored data.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    /// The current auto-save, read without going through the trait.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn current_auto_save(&self) -> Option<SaveRecord> {
        self.auto_save.lock().unwrap().clone()
    }

    fn check_failing(&self) -> Result<(), ProgressError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProgressError::StorageWriteFailed(
                "simulated write failure".to_owned(),
            ));
        }
        Ok(())
    }
}

impl SaveStore for RecordingSaveStore {
    fn load_auto_save(&self) -> Option<SaveRecord> {
        self.auto_save.lock().unwrap().clone()
    }

    fn write_auto_save(&self, record: &SaveRecord) -> Result<(), ProgressError> {
        self.check_failing()?;
        *self.auto_save.lock().unwrap() = Some(record.clone());
        self.writes.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn list_slots(&self) -> Vec<SaveSlot> {
        self.slots.lock().unwrap().list.clone()
    }

    fn upsert_slot(&self, index: usize, record: &SaveRecord) -> Result<(), ProgressError> {
        self.check_failing()?;
        self.slots.lock().unwrap().upsert(index, record.clone())
    }

    fn delete_slot(&self, index: usize) -> Result<(), ProgressError> {
        self.check_failing()?;
        self.slots.lock().unwrap().delete(index);
        Ok(())
    }

    fn reset_all(&self) -> Result<(), ProgressError> {
        self.check_failing()?;
        *self.auto_save.lock().unwrap() = None;
        *self.slots.lock().unwrap() = SlotList::default();
        Ok(())
    }
}
