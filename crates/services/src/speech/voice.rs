use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use buddy_core::model::{CaptureResult, RecordedPhrase};
use storage::RecordingStore;
use storage::wav::encode_phrase;

use super::SpeechService;
use super::synth::SystemSynthesizer;
use super::transcribe::Transcriber;
use crate::config::CaptureConfig;
use crate::error::MicrophoneError;

/// Where spoken phrases come from.
#[async_trait]
pub trait PhraseSource: Send + Sync {
    /// Record one phrase. `Ok(None)` means nobody spoke in time.
    ///
    /// # Errors
    ///
    /// Returns `MicrophoneError` if no device can be opened or streamed from.
    async fn record_phrase(&self) -> Result<Option<RecordedPhrase>, MicrophoneError>;
}

/// Real voice I/O: system TTS, one recorded phrase per capture, one WAV per
/// attempt, and transcription when configured.
///
/// Each stage fails on its own: a failed save still allows a transcript and a
/// failed or slow transcription still keeps the saved file.
pub struct VoiceSpeechService {
    synth: SystemSynthesizer,
    phrases: Arc<dyn PhraseSource>,
    recordings: Arc<dyn RecordingStore>,
    transcriber: Option<Arc<dyn Transcriber>>,
    transcription_allowance: Duration,
}

impl VoiceSpeechService {
    #[must_use]
    pub fn new(
        synth: SystemSynthesizer,
        phrases: Arc<dyn PhraseSource>,
        recordings: Arc<dyn RecordingStore>,
        transcriber: Option<Arc<dyn Transcriber>>,
    ) -> Self {
        if transcriber.is_none() {
            tracing::warn!("no transcription endpoint configured; answers will be saved only");
        }
        Self {
            synth,
            phrases,
            recordings,
            transcriber,
            transcription_allowance: CaptureConfig::default().transcription_allowance,
        }
    }

    /// Give up on transcription after `allowance` and keep the saved file.
    #[must_use]
    pub fn with_transcription_allowance(mut self, allowance: Duration) -> Self {
        self.transcription_allowance = allowance;
        self
    }

    async fn save(&self, wav: &[u8]) -> Option<PathBuf> {
        match self.recordings.save(wav).await {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(error = %err, "could not save recording");
                None
            }
        }
    }

    async fn transcribe(&self, wav: &[u8]) -> Option<String> {
        let transcriber = self.transcriber.as_ref()?;
        match tokio::time::timeout(self.transcription_allowance, transcriber.transcribe(wav)).await
        {
            Ok(Ok(text)) => Some(text),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "transcription failed");
                None
            }
            Err(_) => {
                tracing::warn!(allowance = ?self.transcription_allowance, "transcription timed out");
                None
            }
        }
    }
}

#[async_trait]
impl SpeechService for VoiceSpeechService {
    fn speak(&self, text: &str) {
        self.synth.speak(text);
    }

    async fn capture(&self) -> CaptureResult {
        let phrase = match self.phrases.record_phrase().await {
            Ok(Some(phrase)) => phrase,
            Ok(None) => {
                tracing::info!("no speech detected");
                return CaptureResult::absent();
            }
            Err(err) => {
                tracing::warn!(error = %err, "microphone capture failed");
                return CaptureResult::absent();
            }
        };
        tracing::debug!(secs = phrase.duration_secs(), "phrase recorded");

        let wav = match encode_phrase(&phrase) {
            Ok(wav) => wav,
            Err(err) => {
                tracing::warn!(error = %err, "could not encode recording");
                return CaptureResult::absent();
            }
        };

        let saved_path = self.save(&wav).await;
        let transcript = self.transcribe(&wav).await;
        CaptureResult::new(transcript, saved_path)
    }

    fn backend_name(&self) -> &'static str {
        "voice"
    }
}
