//! Wordtrail Store — durable storage for the auto-save and manual slots.

pub mod envelope;
pub mod file_save_store;

pub use file_save_store::FileSaveStore;
