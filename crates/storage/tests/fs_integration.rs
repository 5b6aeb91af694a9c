use buddy_core::time::{fixed_clock, fixed_now};
use storage::fs::FsRecordingStore;
use buddy_core::model::RecordedPhrase;
use storage::wav::{SPEECH_SAMPLE_RATE, encode_phrase};
use storage::{RecordingStore, Storage, StorageError};

#[tokio::test]
async fn filesystem_store_saves_lists_and_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsRecordingStore::open(dir.path().join("recordings"), fixed_clock()).unwrap();

    let wav = encode_phrase(&RecordedPhrase::new(vec![0.0, 0.25, -0.25], SPEECH_SAMPLE_RATE)).unwrap();
    let first = store.save(&wav).await.unwrap();
    let second = store.save(&wav).await.unwrap();

    assert_eq!(
        first.file_name().unwrap().to_str().unwrap(),
        "answer_20231114_221320.wav"
    );
    assert_eq!(
        second.file_name().unwrap().to_str().unwrap(),
        "answer_20231114_221320_1.wav"
    );
    assert_eq!(std::fs::read(&first).unwrap(), wav);

    // Non-WAV files are not recordings.
    std::fs::write(store.dir().join("notes.txt"), b"hello").unwrap();

    let listed = store.list().await.unwrap();
    let names: Vec<_> = listed.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["answer_20231114_221320.wav", "answer_20231114_221320_1.wav"]
    );
    // Modified time comes from the filesystem, not the fixed clock.
    assert!(listed[0].modified_at > fixed_now());

    store.delete("answer_20231114_221320.wav").await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 1);
    assert!(matches!(
        store.delete("answer_20231114_221320.wav").await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn filesystem_store_rejects_escaping_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsRecordingStore::open(dir.path(), fixed_clock()).unwrap();

    assert!(matches!(
        store.delete("../outside.wav").await,
        Err(StorageError::InvalidName(_))
    ));
    assert!(matches!(
        store.play("missing.wav").await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn storage_aggregate_uses_directory() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::filesystem(dir.path().join("nested/dir"), fixed_clock()).unwrap();
    assert!(storage.recordings.list().await.unwrap().is_empty());
    assert!(dir.path().join("nested/dir").is_dir());
}
