use chrono::{DateTime, Utc};

use buddy_core::model::TranscriptRecord;

/// Progress notifications sent from a running session to whoever displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The prompt at `index` was handed to speech output.
    Asking {
        index: usize,
        prompt: String,
        asked_at: DateTime<Utc>,
    },
    /// A capture attempt started for the prompt at `index`.
    Listening { index: usize },
    Answered(TranscriptRecord),
    /// Every prompt was asked. `answered` counts records with a transcript.
    Completed { answered: usize },
}
