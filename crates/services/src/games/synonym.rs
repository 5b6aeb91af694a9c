use std::sync::Arc;
use std::time::Duration;

use buddy_core::model::{CaptureResult, GameRound, RoundTarget};
use buddy_core::scoring::{GameEvaluator, SynonymResolver};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{ListenGuard, NOT_UNDERSTOOD};
use crate::config::SessionTiming;
use crate::error::GameError;
use crate::speech::{SpeechService, capture_within};

/// "Say a synonym" game over whichever resolver was selected at startup.
pub struct SynonymGame {
    speech: Arc<dyn SpeechService>,
    resolver: Arc<dyn SynonymResolver>,
    capture_deadline: Duration,
    rng: StdRng,
    round: Option<GameRound>,
}

impl SynonymGame {
    #[must_use]
    pub fn new(speech: Arc<dyn SpeechService>, resolver: Arc<dyn SynonymResolver>) -> Self {
        Self {
            speech,
            resolver,
            capture_deadline: SessionTiming::default().capture_deadline,
            rng: StdRng::from_os_rng(),
            round: None,
        }
    }

    /// Deterministic word picks.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Longest a single `listen` waits for its capture.
    #[must_use]
    pub fn with_capture_deadline(mut self, deadline: Duration) -> Self {
        self.capture_deadline = deadline;
        self
    }

    #[must_use]
    pub fn round(&self) -> Option<&GameRound> {
        self.round.as_ref()
    }

    /// Pick a new word and announce it.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NothingToPick` if the resolver has no usable entry.
    pub fn new_round(&mut self) -> Result<&GameRound, GameError> {
        let entry = self
            .resolver
            .pick_random_entry(&mut self.rng)
            .ok_or(GameError::NothingToPick)?;
        tracing::info!(
            word = %entry.word,
            backend = self.resolver.backend_name(),
            "new synonym round"
        );
        self.speech
            .speak(&format!("Say a synonym for {}", entry.word));
        Ok(&*self
            .round
            .insert(GameRound::synonym(entry.word, entry.synonyms)))
    }

    /// Mark a capture as started and hand back the speech service to run it.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoRound` or `GameError::CaptureInFlight`.
    pub fn begin_listen(&mut self) -> Result<Arc<dyn SpeechService>, GameError> {
        let round = self.round.as_mut().ok_or(GameError::NoRound)?;
        round.begin_capture()?;
        Ok(Arc::clone(&self.speech))
    }

    /// Score a finished capture against the current word.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoRound` or a round error if no capture was begun.
    pub fn complete_listen(&mut self, capture: CaptureResult) -> Result<&GameRound, GameError> {
        let round = self.round.as_mut().ok_or(GameError::NoRound)?;
        let (outcome, feedback) = match capture.transcript {
            None => (None, NOT_UNDERSTOOD.to_owned()),
            Some(transcript) => {
                let RoundTarget::Synonym { word, supplied } = round.target() else {
                    return Err(GameError::NoRound);
                };
                let verdict = GameEvaluator::new(self.resolver.as_ref())
                    .judge_synonym(&transcript, word, supplied);
                tracing::info!(%word, %transcript, matched = verdict.is_match(), "synonym judged");
                let feedback = verdict.feedback(&transcript);
                (Some(verdict.into()), feedback)
            }
        };
        round.finish_capture(outcome, feedback)?;
        Ok(&*round)
    }

    /// Listen once and score the answer.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoRound` before the first round, or
    /// `GameError::CaptureInFlight` while another capture is outstanding.
    pub async fn listen(&mut self) -> Result<&GameRound, GameError> {
        let speech = self.begin_listen()?;
        let guard = ListenGuard::new(&mut self.round);
        let capture = capture_within(speech, self.capture_deadline).await;
        guard.disarm();
        self.complete_listen(capture)
    }
}
