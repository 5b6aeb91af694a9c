//! Shared error types for the services crate.

use thiserror::Error;

use buddy_core::model::{PromptError, RoundError, SessionStateError};
use storage::StorageError;

/// Errors emitted by `CloudTranscriber`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranscriptionError {
    #[error("transcription returned an empty transcript")]
    EmptyTranscript,
    #[error("transcription request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors from recording a phrase.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MicrophoneError {
    #[error("no input device available")]
    NoDevice,
    #[error("audio device error: {0}")]
    Device(String),
    #[error("capture thread failed: {0}")]
    Join(String),
}

/// Errors emitted by `SessionSequencer`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no session started")]
    NotStarted,
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    State(#[from] SessionStateError),
}

/// Errors emitted by the game services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("no round in progress")]
    NoRound,
    #[error("a capture is already in progress")]
    CaptureInFlight,
    #[error("nothing to pick a round from")]
    NothingToPick,
    #[error(transparent)]
    Round(RoundError),
}

impl From<RoundError> for GameError {
    fn from(err: RoundError) -> Self {
        match err {
            RoundError::CaptureInFlight => Self::CaptureInFlight,
            other => Self::Round(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
