//! `SaveStore` backed by JSON files in a save directory.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wordtrail_core::error::ProgressError;
use wordtrail_core::save::{SaveRecord, SaveSlot, SlotList};
use wordtrail_core::store::SaveStore;

use crate::envelope;

/// File name of the auto-save.
pub const AUTO_SAVE_FILE: &str = "autosave.json";

/// File name of the manual slot list.
pub const SLOTS_FILE: &str = "saves.json";

/// File-backed save store.
///
/// Each file is replaced atomically (temp file, fsync, rename), so a failed
/// write leaves the previous contents in place. Writes to the same file are
/// serialized by a per-file mutex. Unreadable files load as absent.
#[derive(Debug)]
pub struct FileSaveStore {
    dir: PathBuf,
    auto_save_lock: Mutex<()>,
    slots_lock: Mutex<()>,
}

impl FileSaveStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            auto_save_lock: Mutex::new(()),
            slots_lock: Mutex::new(()),
        }
    }

    /// The save directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn auto_save_path(&self) -> PathBuf {
        self.dir.join(AUTO_SAVE_FILE)
    }

    fn slots_path(&self) -> PathBuf {
        self.dir.join(SLOTS_FILE)
    }

    fn read_slots(&self) -> SlotList {
        let mut slots = read_document::<SlotList>(&self.slots_path()).unwrap_or_default();
        slots.renumber();
        slots
    }

    fn write_slots(&self, slots: &SlotList) -> Result<(), ProgressError> {
        write_document(&self.slots_path(), slots)
    }
}

impl SaveStore for FileSaveStore {
    fn load_auto_save(&self) -> Option<SaveRecord> {
        read_document(&self.auto_save_path())
    }

    fn write_auto_save(&self, record: &SaveRecord) -> Result<(), ProgressError> {
        let _guard = lock(&self.auto_save_lock);
        write_document(&self.auto_save_path(), record)
    }

    fn list_slots(&self) -> Vec<SaveSlot> {
        self.read_slots().list
    }

    fn upsert_slot(&self, index: usize, record: &SaveRecord) -> Result<(), ProgressError> {
        let _guard = lock(&self.slots_lock);
        let mut slots = self.read_slots();
        slots.upsert(index, record.clone())?;
        self.write_slots(&slots)
    }

    fn delete_slot(&self, index: usize) -> Result<(), ProgressError> {
        let _guard = lock(&self.slots_lock);
        let mut slots = self.read_slots();
        if !slots.delete(index) {
            debug!(index, "no such slot to delete");
            return Ok(());
        }
        self.write_slots(&slots)
    }

    fn reset_all(&self) -> Result<(), ProgressError> {
        let _auto = lock(&self.auto_save_lock);
        let _slots = lock(&self.slots_lock);
        remove_if_present(&self.auto_save_path())?;
        remove_if_present(&self.slots_path())?;
        warn!(dir = %self.dir.display(), "all saved progress deleted");
        Ok(())
    }
}

/// A poisoned lock only means another writer panicked; the file itself is
/// still whole because of the atomic rename.
fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Reads and decodes `path`. A missing file is `None`; an unreadable one is
/// logged and also `None`.
fn read_document<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            let err = ProgressError::CorruptSave(format!("{}: {err}", path.display()));
            warn!(error = %err, "save file unreadable, treating as absent");
            return None;
        }
    };
    match envelope::open(&bytes) {
        Ok(document) => Some(document),
        Err(err) => {
            let err = ProgressError::CorruptSave(format!("{}: {err}", path.display()));
            warn!(error = %err, "save file corrupt, treating as absent");
            None
        }
    }
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), ProgressError> {
    let bytes = envelope::seal(document).map_err(|err| write_failed(path, &err))?;
    write_atomic(path, &bytes).map_err(|err| {
        let err = write_failed(path, &err);
        warn!(error = %err, "save write failed, previous file kept");
        err
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "save file written");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = temp_path(path)?;
    if let Err(err) = write_synced(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    #[cfg(windows)]
    {
        if path.exists() {
            // rename does not replace an existing file on Windows.
            fs::remove_file(path)?;
        }
    }

    fs::rename(&tmp_path, path)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "save path has no file name")
    })?;
    let mut tmp_name = OsString::from(name);
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

fn remove_if_present(path: &Path) -> Result<(), ProgressError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(write_failed(path, &err)),
    }
}

fn write_failed(path: &Path, err: &dyn std::fmt::Display) -> ProgressError {
    ProgressError::StorageWriteFailed(format!("{}: {err}", path.display()))
}
