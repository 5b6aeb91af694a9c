#![forbid(unsafe_code)]

pub mod fs;
pub mod repository;
pub mod wav;

pub use repository::{InMemoryRecordingStore, RecordingEntry, RecordingStore, Storage, StorageError};
