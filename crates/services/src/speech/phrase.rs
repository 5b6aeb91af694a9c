//! Energy-based detection of one spoken phrase in a sample stream.

use std::time::Duration;

use crate::config::CaptureConfig;

/// Floor for the speech threshold so a silent room does not trigger on hiss.
const MIN_THRESHOLD: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseEvent {
    Calibrating,
    Waiting,
    Speaking,
    /// A phrase was recorded; take it with `into_phrase`.
    Finished,
    /// Nobody spoke before the start timeout.
    NoSpeech,
}

/// Feed mono chunks with `push`; the detector calibrates on ambient noise,
/// waits for speech, then records until trailing silence or the phrase limit.
#[derive(Debug, Clone)]
pub struct PhraseDetector {
    calibration_samples: usize,
    start_samples: usize,
    phrase_samples: usize,
    silence_samples: usize,
    energy_ratio: f32,

    state: PhraseEvent,
    ambient_sum: f64,
    ambient_count: usize,
    threshold: f32,
    waited: usize,
    silence_run: usize,
    phrase: Vec<f32>,
}

fn samples_for(duration: Duration, sample_rate: u32) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (duration.as_secs_f64() * f64::from(sample_rate)) as usize;
    n
}

fn rms(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    let sum: f32 = chunk.iter().map(|s| s * s).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum / chunk.len() as f32;
    mean.sqrt()
}

impl PhraseDetector {
    #[must_use]
    pub fn new(config: &CaptureConfig, sample_rate: u32) -> Self {
        let calibration_samples = samples_for(config.ambient_calibration, sample_rate);
        Self {
            calibration_samples,
            start_samples: samples_for(config.start_timeout, sample_rate),
            phrase_samples: samples_for(config.phrase_limit, sample_rate).max(1),
            silence_samples: samples_for(config.trailing_silence, sample_rate).max(1),
            energy_ratio: config.energy_ratio,
            state: if calibration_samples == 0 {
                PhraseEvent::Waiting
            } else {
                PhraseEvent::Calibrating
            },
            ambient_sum: 0.0,
            ambient_count: 0,
            threshold: MIN_THRESHOLD,
            waited: 0,
            silence_run: 0,
            phrase: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> PhraseEvent {
        self.state
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, PhraseEvent::Finished | PhraseEvent::NoSpeech)
    }

    pub fn push(&mut self, chunk: &[f32]) -> PhraseEvent {
        if self.is_done() || chunk.is_empty() {
            return self.state;
        }
        let level = rms(chunk);

        match self.state {
            PhraseEvent::Calibrating => {
                self.ambient_sum += f64::from(level) * chunk.len() as f64;
                self.ambient_count += chunk.len();
                if self.ambient_count >= self.calibration_samples {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                    let ambient = (self.ambient_sum / self.ambient_count as f64) as f32;
                    self.threshold = (ambient * self.energy_ratio).max(MIN_THRESHOLD);
                    tracing::debug!(ambient, threshold = self.threshold, "ambient noise calibrated");
                    self.state = PhraseEvent::Waiting;
                }
            }
            PhraseEvent::Waiting => {
                if level >= self.threshold {
                    self.phrase.extend_from_slice(chunk);
                    self.state = PhraseEvent::Speaking;
                    self.finish_if_full();
                } else {
                    self.waited += chunk.len();
                    if self.waited >= self.start_samples {
                        self.state = PhraseEvent::NoSpeech;
                    }
                }
            }
            PhraseEvent::Speaking => {
                self.phrase.extend_from_slice(chunk);
                if level < self.threshold {
                    self.silence_run += chunk.len();
                } else {
                    self.silence_run = 0;
                }
                if self.silence_run >= self.silence_samples {
                    self.state = PhraseEvent::Finished;
                } else {
                    self.finish_if_full();
                }
            }
            PhraseEvent::Finished | PhraseEvent::NoSpeech => {}
        }
        self.state
    }

    /// Stream ended early (device closed). Whatever was spoken counts.
    pub fn close(&mut self) -> PhraseEvent {
        self.state = match self.state {
            PhraseEvent::Speaking | PhraseEvent::Finished => PhraseEvent::Finished,
            _ => PhraseEvent::NoSpeech,
        };
        self.state
    }

    /// Recorded phrase samples, capped at the phrase limit.
    #[must_use]
    pub fn into_phrase(mut self) -> Option<Vec<f32>> {
        if self.state != PhraseEvent::Finished || self.phrase.is_empty() {
            return None;
        }
        self.phrase.truncate(self.phrase_samples);
        Some(self.phrase)
    }

    fn finish_if_full(&mut self) {
        if self.phrase.len() >= self.phrase_samples {
            self.state = PhraseEvent::Finished;
        }
    }
}
