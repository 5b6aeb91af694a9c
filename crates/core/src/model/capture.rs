use std::path::PathBuf;

use crate::text::non_blank;

/// What one capture attempt produced.
///
/// Every failure mode (no microphone, timeout, unintelligible audio, file
/// write failure) shows up as an absent field rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureResult {
    pub transcript: Option<String>,
    pub saved_path: Option<PathBuf>,
}

impl CaptureResult {
    /// A capture that produced nothing.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Build a result, treating a blank transcript as absent.
    #[must_use]
    pub fn new(transcript: Option<String>, saved_path: Option<PathBuf>) -> Self {
        Self {
            transcript: non_blank(transcript),
            saved_path,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.transcript.is_none() && self.saved_path.is_none()
    }
}

/// Mono samples of one spoken phrase, in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPhrase {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl RecordedPhrase {
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}
