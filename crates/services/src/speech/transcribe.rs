use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::TranscriptionConfig;
use crate::error::TranscriptionError;

/// Turns a WAV recording into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe WAV bytes.
    ///
    /// # Errors
    ///
    /// Returns `TranscriptionError` when no usable transcript comes back.
    async fn transcribe(&self, wav: &[u8]) -> Result<String, TranscriptionError>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Sends WAV audio to an OpenAI-compatible `/audio/transcriptions` endpoint.
#[derive(Clone)]
pub struct CloudTranscriber {
    client: Client,
    config: TranscriptionConfig,
}

impl CloudTranscriber {
    /// Every request, body included, must finish within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TranscriptionError::Http` if the HTTP client cannot be built.
    pub fn new(config: TranscriptionConfig, timeout: Duration) -> Result<Self, TranscriptionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Transcriber for CloudTranscriber {
    async fn transcribe(&self, wav: &[u8]) -> Result<String, TranscriptionError> {
        tracing::debug!(audio_bytes = wav.len(), "starting transcription");

        let part = Part::bytes(wav.to_vec())
            .file_name("answer.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.config.model.clone());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptionError::HttpStatus(status));
        }

        let body: TranscriptionResponse = response.json().await?;
        let text = body.text.trim().to_owned();
        if text.is_empty() {
            return Err(TranscriptionError::EmptyTranscript);
        }
        tracing::info!(transcript = %text, "transcription complete");
        Ok(text)
    }
}
