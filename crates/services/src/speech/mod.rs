//! Speech output and answer capture.
//!
//! `SpeechService` is the only seam between the practice logic and the audio
//! stack. Implementations never surface errors: speaking is fire-and-forget and
//! every capture failure collapses into an absent transcript or path.

mod console;
mod deadline;
#[cfg(feature = "microphone")]
mod microphone;
mod phrase;
mod scripted;
mod synth;
mod transcribe;
mod voice;

use async_trait::async_trait;
use buddy_core::model::CaptureResult;

pub use console::{ConsoleSpeechService, SpokenConsoleService};
pub use deadline::capture_within;
#[cfg(feature = "microphone")]
pub use microphone::Microphone;
pub use phrase::{PhraseDetector, PhraseEvent};
pub use scripted::{ScriptedCapture, ScriptedSpeechService};
pub use synth::SystemSynthesizer;
pub use transcribe::{CloudTranscriber, Transcriber};
pub use voice::{PhraseSource, VoiceSpeechService};

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Start speaking `text` and return immediately.
    fn speak(&self, text: &str);

    /// Listen for one answer.
    async fn capture(&self) -> CaptureResult;

    /// Short name for logs.
    fn backend_name(&self) -> &'static str;
}
