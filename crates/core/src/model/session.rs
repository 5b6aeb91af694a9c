use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{CaptureResult, PromptList};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("session already completed")]
    Completed,
}

/// Outcome of asking a single prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRecord {
    pub index: usize,
    pub prompt: String,
    pub asked_at: DateTime<Utc>,
    pub transcript: Option<String>,
    pub saved_path: Option<PathBuf>,
}

impl TranscriptRecord {
    /// Neither a transcript nor a saved file came back.
    #[must_use]
    pub fn is_unanswered(&self) -> bool {
        self.transcript.is_none() && self.saved_path.is_none()
    }
}

/// Position within a practice session plus everything recorded so far.
///
/// `current_index` moves forward by exactly one per recorded answer. Once it
/// reaches the number of prompts the session is completed and stays that way
/// until a new `SessionState` replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    prompts: PromptList,
    current_index: usize,
    transcripts: Vec<TranscriptRecord>,
}

impl SessionState {
    #[must_use]
    pub fn new(prompts: PromptList) -> Self {
        Self {
            prompts,
            current_index: 0,
            transcripts: Vec::new(),
        }
    }

    #[must_use]
    pub fn prompts(&self) -> &PromptList {
        &self.prompts
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn transcripts(&self) -> &[TranscriptRecord] {
        &self.transcripts
    }

    /// Prompt waiting to be asked, or `None` once completed.
    #[must_use]
    pub fn current_prompt(&self) -> Option<&str> {
        self.prompts.get(self.current_index)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.current_index >= self.prompts.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.prompts.len().saturating_sub(self.current_index)
    }

    /// Append the outcome for the current prompt and step forward.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Completed` if every prompt has been answered.
    pub fn record(
        &mut self,
        asked_at: DateTime<Utc>,
        capture: CaptureResult,
    ) -> Result<&TranscriptRecord, SessionStateError> {
        let Some(prompt) = self.current_prompt() else {
            return Err(SessionStateError::Completed);
        };

        let record = TranscriptRecord {
            index: self.current_index,
            prompt: prompt.to_owned(),
            asked_at,
            transcript: capture.transcript,
            saved_path: capture.saved_path,
        };
        self.transcripts.push(record);
        self.current_index += 1;

        self.transcripts.last().ok_or(SessionStateError::Completed)
    }
}
