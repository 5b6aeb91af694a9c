use async_trait::async_trait;
use buddy_core::Clock;
use buddy_core::time::recording_stamp;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by recording stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("invalid recording name: {0}")]
    InvalidName(String),

    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One saved answer as shown in the recordings list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingEntry {
    pub file_name: String,
    pub modified_at: DateTime<Utc>,
}

/// Prefix shared by every recording file name.
pub const RECORDING_PREFIX: &str = "answer_";

/// Recording file name for a one-second timestamp stamp, with an optional
/// collision suffix (`answer_20231114_221320_1.wav`).
#[must_use]
pub fn recording_file_name(stamp: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{RECORDING_PREFIX}{stamp}.wav")
    } else {
        format!("{RECORDING_PREFIX}{stamp}_{attempt}.wav")
    }
}

/// Reject anything that is not a bare file name inside the store.
///
/// # Errors
///
/// Returns `StorageError::InvalidName` for empty names, path separators or `..`.
pub fn validate_file_name(name: &str) -> Result<&str, StorageError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::InvalidName(name.to_owned()));
    }
    Ok(trimmed)
}

#[must_use]
pub fn is_wav_name(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Store for one WAV file per answer attempt.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    /// Persist WAV bytes under a fresh timestamped name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be written.
    async fn save(&self, wav: &[u8]) -> Result<PathBuf, StorageError>;

    /// List WAV recordings, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn list(&self) -> Result<Vec<RecordingEntry>, StorageError>;

    /// Hand a recording to the system player.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or a playback error.
    async fn play(&self, file_name: &str) -> Result<(), StorageError>;

    /// Remove a recording.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete(&self, file_name: &str) -> Result<(), StorageError>;

    /// Show the recordings folder in the system file browser.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Playback` if the browser cannot be started.
    async fn open_folder(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
struct StoredRecording {
    bytes: Vec<u8>,
    modified_at: DateTime<Utc>,
}

/// Simple in-memory recording store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRecordingStore {
    clock: Clock,
    recordings: Arc<Mutex<BTreeMap<String, StoredRecording>>>,
    played: Arc<Mutex<Vec<String>>>,
    folder_opened: Arc<Mutex<u32>>,
    fail_saves: bool,
}

impl InMemoryRecordingStore {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    /// Every `save` fails, like a full or read-only disk.
    #[must_use]
    pub fn with_failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Names passed to `play`, oldest first.
    #[must_use]
    pub fn played(&self) -> Vec<String> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// How often `open_folder` was called.
    #[must_use]
    pub fn folder_opened(&self) -> u32 {
        self.folder_opened.lock().map(|n| *n).unwrap_or_default()
    }

    /// Raw bytes of a stored recording.
    #[must_use]
    pub fn bytes_of(&self, file_name: &str) -> Option<Vec<u8>> {
        self.recordings
            .lock()
            .ok()?
            .get(file_name)
            .map(|r| r.bytes.clone())
    }
}

#[async_trait]
impl RecordingStore for InMemoryRecordingStore {
    async fn save(&self, wav: &[u8]) -> Result<PathBuf, StorageError> {
        if self.fail_saves {
            return Err(StorageError::Io(std::io::Error::other("save disabled")));
        }
        let now = self.clock.now();
        let stamp = recording_stamp(&self.clock, now);
        let mut guard = self
            .recordings
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;

        let mut attempt = 0;
        let mut name = recording_file_name(&stamp, attempt);
        while guard.contains_key(&name) {
            attempt += 1;
            name = recording_file_name(&stamp, attempt);
        }
        guard.insert(
            name.clone(),
            StoredRecording {
                bytes: wav.to_vec(),
                modified_at: now,
            },
        );
        Ok(PathBuf::from("memory").join(name))
    }

    async fn list(&self) -> Result<Vec<RecordingEntry>, StorageError> {
        let guard = self
            .recordings
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|(name, _)| is_wav_name(name))
            .map(|(name, rec)| RecordingEntry {
                file_name: name.clone(),
                modified_at: rec.modified_at,
            })
            .collect())
    }

    async fn play(&self, file_name: &str) -> Result<(), StorageError> {
        let name = validate_file_name(file_name)?;
        let exists = self
            .recordings
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?
            .contains_key(name);
        if !exists {
            return Err(StorageError::NotFound);
        }
        self.played
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?
            .push(name.to_owned());
        Ok(())
    }

    async fn delete(&self, file_name: &str) -> Result<(), StorageError> {
        let name = validate_file_name(file_name)?;
        let mut guard = self
            .recordings
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        guard.remove(name).map(|_| ()).ok_or(StorageError::NotFound)
    }

    async fn open_folder(&self) -> Result<(), StorageError> {
        *self
            .folder_opened
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))? += 1;
        Ok(())
    }
}

/// Aggregates storage backends behind trait objects for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub recordings: Arc<dyn RecordingStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        let recordings: Arc<dyn RecordingStore> = Arc::new(InMemoryRecordingStore::new(clock));
        Self { recordings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::time::fixed_clock;

    #[tokio::test]
    async fn saves_with_timestamp_and_collision_suffix() {
        let store = InMemoryRecordingStore::new(fixed_clock());
        let first = store.save(b"one").await.unwrap();
        let second = store.save(b"two").await.unwrap();

        assert_eq!(first, PathBuf::from("memory/answer_20231114_221320.wav"));
        assert_eq!(second, PathBuf::from("memory/answer_20231114_221320_1.wav"));
        assert_eq!(
            store.bytes_of("answer_20231114_221320_1.wav"),
            Some(b"two".to_vec())
        );
    }

    #[tokio::test]
    async fn list_play_and_delete() {
        let store = InMemoryRecordingStore::new(fixed_clock());
        store.save(b"one").await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        let name = listed[0].file_name.clone();

        store.play(&name).await.unwrap();
        assert_eq!(store.played(), vec![name.clone()]);

        store.open_folder().await.unwrap();
        assert_eq!(store.folder_opened(), 1);

        store.delete(&name).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.delete(&name).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn failing_store_reports_io_error() {
        let store = InMemoryRecordingStore::new(fixed_clock()).with_failing_saves();
        assert!(matches!(store.save(b"x").await, Err(StorageError::Io(_))));
    }

    #[test]
    fn rejects_paths_outside_the_store() {
        for bad in ["", "  ", "../secret.wav", "a/b.wav", "a\\b.wav", "."] {
            assert!(
                matches!(validate_file_name(bad), Err(StorageError::InvalidName(_))),
                "{bad:?}"
            );
        }
        assert_eq!(validate_file_name(" answer_1.wav ").unwrap(), "answer_1.wav");
    }

    #[test]
    fn wav_extension_is_case_insensitive() {
        assert!(is_wav_name("a.WAV"));
        assert!(is_wav_name("a.wav"));
        assert!(!is_wav_name("a.mp3"));
        assert!(!is_wav_name("wav"));
    }
}
