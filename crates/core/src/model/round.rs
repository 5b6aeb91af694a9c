use thiserror::Error;

/// Shown in place of a sentence the player should not read.
pub const HIDDEN_SENTENCE: &str = "**** (hidden) ****";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundError {
    #[error("a capture is already in flight for this round")]
    CaptureInFlight,

    #[error("no capture was started for this round")]
    NoCaptureStarted,
}

/// What the player is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundTarget {
    /// Say a synonym of `word`. `supplied` carries synonyms that came with the
    /// word when it was picked.
    Synonym { word: String, supplied: Vec<String> },
    /// Repeat `sentence` from memory.
    Repeat { sentence: String, hidden: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Unscored,
    Matched { synonym: String },
    NotMatched { hints: Vec<String> },
    /// Repeat rounds have no pass mark, only a similarity percentage.
    Scored { percent: u8 },
}

/// One attempt at a game prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRound {
    target: RoundTarget,
    outcome: RoundOutcome,
    feedback: String,
    revealed: bool,
    capture_in_flight: bool,
}

impl GameRound {
    #[must_use]
    pub fn synonym(word: impl Into<String>, supplied: Vec<String>) -> Self {
        Self::with_target(RoundTarget::Synonym {
            word: word.into(),
            supplied,
        })
    }

    #[must_use]
    pub fn repeat(sentence: impl Into<String>, hidden: bool) -> Self {
        Self::with_target(RoundTarget::Repeat {
            sentence: sentence.into(),
            hidden,
        })
    }

    fn with_target(target: RoundTarget) -> Self {
        let feedback = match &target {
            RoundTarget::Synonym { word, .. } => format!("Say a synonym for '{word}'."),
            RoundTarget::Repeat { .. } => "Listen to the sentence, then repeat it.".to_owned(),
        };
        Self {
            target,
            outcome: RoundOutcome::Unscored,
            feedback,
            revealed: false,
            capture_in_flight: false,
        }
    }

    #[must_use]
    pub fn target(&self) -> &RoundTarget {
        &self.target
    }

    #[must_use]
    pub fn outcome(&self) -> &RoundOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    #[must_use]
    pub fn is_capture_in_flight(&self) -> bool {
        self.capture_in_flight
    }

    /// Text to show for the challenge. Hidden sentences stay masked until an
    /// attempt has been scored.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match &self.target {
            RoundTarget::Synonym { word, .. } => word,
            RoundTarget::Repeat { sentence, hidden } => {
                if *hidden && !self.revealed {
                    HIDDEN_SENTENCE
                } else {
                    sentence
                }
            }
        }
    }

    /// Mark a capture as started. Only one may be outstanding at a time.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::CaptureInFlight` if a capture is already running.
    pub fn begin_capture(&mut self) -> Result<(), RoundError> {
        if self.capture_in_flight {
            return Err(RoundError::CaptureInFlight);
        }
        self.capture_in_flight = true;
        Ok(())
    }

    /// Drop an outstanding capture that will never report back. Outcome and
    /// feedback stay as they were.
    pub fn abandon_capture(&mut self) {
        self.capture_in_flight = false;
    }

    /// Close the outstanding capture with its result.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::NoCaptureStarted` when no capture was begun.
    pub fn finish_capture(
        &mut self,
        outcome: Option<RoundOutcome>,
        feedback: impl Into<String>,
    ) -> Result<(), RoundError> {
        if !self.capture_in_flight {
            return Err(RoundError::NoCaptureStarted);
        }
        self.capture_in_flight = false;
        self.feedback = feedback.into();
        if let Some(outcome) = outcome {
            if matches!(self.target, RoundTarget::Repeat { .. }) {
                self.revealed = true;
            }
            self.outcome = outcome;
        }
        Ok(())
    }
}
