#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod games;
pub mod lexicon;
pub mod sessions;
pub mod speech;

pub use buddy_core::Clock;

pub use app_services::AppServices;
pub use config::{BuddyConfig, CaptureConfig, SessionTiming, TranscriptionConfig, TtsConfig};
pub use error::{AppServicesError, GameError, MicrophoneError, SessionError, TranscriptionError};
pub use games::{RepeatGame, SynonymGame};
pub use lexicon::select_resolver;
pub use sessions::{AdvanceOutcome, SessionEvent, SessionSequencer};
pub use speech::{
    ConsoleSpeechService, ScriptedCapture, ScriptedSpeechService, SpeechService,
    SpokenConsoleService, capture_within,
};
