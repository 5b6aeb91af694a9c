use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use buddy_core::Clock;
use buddy_core::time::recording_stamp;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::repository::{
    RecordingEntry, RecordingStore, Storage, StorageError, is_wav_name, recording_file_name,
    validate_file_name,
};

/// Upper bound on `_N` suffixes tried for one second's worth of recordings.
const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// Recording store backed by a directory of WAV files.
#[derive(Debug, Clone)]
pub struct FsRecordingStore {
    dir: PathBuf,
    clock: Clock,
}

impl FsRecordingStore {
    /// Open (and create if needed) a recordings directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>, clock: Clock) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "recordings directory ready");
        Ok(Self { dir, clock })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.dir.join(validate_file_name(file_name)?))
    }
}

fn not_found_or_io(err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound
    } else {
        StorageError::Io(err)
    }
}

/// Write `bytes` into a freshly created file. On failure the partial file is
/// removed so it never shows up as a recording.
async fn write_or_discard<W>(path: &Path, mut file: W, bytes: &[u8]) -> Result<(), StorageError>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(err) => Err(err),
    };
    drop(file);
    if let Err(err) = written {
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %cleanup, "could not remove partial recording");
        }
        return Err(err.into());
    }
    Ok(())
}

#[async_trait]
impl RecordingStore for FsRecordingStore {
    async fn save(&self, wav: &[u8]) -> Result<PathBuf, StorageError> {
        let stamp = recording_stamp(&self.clock, self.clock.now());

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(recording_file_name(&stamp, attempt));
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let file = match file {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            };
            write_or_discard(&path, file, wav).await?;
            tracing::debug!(path = %path.display(), bytes = wav.len(), "recording saved");
            return Ok(path);
        }

        Err(StorageError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free recording name for {stamp}"),
        )))
    }

    async fn list(&self) -> Result<Vec<RecordingEntry>, StorageError> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_wav_name(&file_name) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified_at: DateTime<Utc> = metadata.modified()?.into();
            entries.push(RecordingEntry {
                file_name,
                modified_at,
            });
        }
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    async fn play(&self, file_name: &str) -> Result<(), StorageError> {
        let path = self.resolve(file_name)?;
        tokio::fs::metadata(&path).await.map_err(not_found_or_io)?;

        tracing::info!(path = %path.display(), "opening recording in system player");
        tokio::task::spawn_blocking(move || open::that(&path))
            .await
            .map_err(|e| StorageError::Playback(e.to_string()))?
            .map_err(|e| StorageError::Playback(e.to_string()))
    }

    async fn delete(&self, file_name: &str) -> Result<(), StorageError> {
        let path = self.resolve(file_name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(not_found_or_io)?;
        tracing::info!(path = %path.display(), "recording deleted");
        Ok(())
    }

    async fn open_folder(&self) -> Result<(), StorageError> {
        let dir = self.dir.clone();
        tracing::info!(dir = %dir.display(), "opening recordings folder");
        tokio::task::spawn_blocking(move || open::that(&dir))
            .await
            .map_err(|e| StorageError::Playback(e.to_string()))?
            .map_err(|e| StorageError::Playback(e.to_string()))
    }
}

impl Storage {
    /// Build a `Storage` backed by a recordings directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be created.
    pub fn filesystem(dir: impl Into<PathBuf>, clock: Clock) -> Result<Self, StorageError> {
        let store = FsRecordingStore::open(dir, clock)?;
        let recordings: Arc<dyn RecordingStore> = Arc::new(store);
        Ok(Self { recordings })
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;

    #[test]
    fn store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FsRecordingStore>();
    }

    /// Accepts nothing, like a full disk.
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_no_partial_recording() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRecordingStore::open(dir.path(), Clock::system()).unwrap();
        let path = dir.path().join("answer_20231114_221320.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let err = write_or_discard(&path, FullDisk, b"RIFF....WAVE").await;
        assert!(matches!(err, Err(StorageError::Io(_))));
        assert!(!path.exists());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_write_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer.wav");
        let file = tokio::fs::File::create(&path).await.unwrap();

        write_or_discard(&path, file, b"RIFF").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
    }
}
