use std::sync::Arc;
use std::time::Duration;

use buddy_core::catalog::REPEAT_SENTENCES;
use buddy_core::model::{CaptureResult, GameRound, RoundOutcome, RoundTarget};
use buddy_core::scoring::judge_repeat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ListenGuard, NOT_UNDERSTOOD};
use crate::config::SessionTiming;
use crate::error::GameError;
use crate::speech::{SpeechService, capture_within};

/// "Listen and repeat" game. The sentence is spoken aloud and, when hidden,
/// masked on screen until the first scored attempt.
pub struct RepeatGame {
    speech: Arc<dyn SpeechService>,
    sentences: Vec<String>,
    hide_sentence: bool,
    capture_deadline: Duration,
    rng: StdRng,
    round: Option<GameRound>,
}

impl RepeatGame {
    #[must_use]
    pub fn new(speech: Arc<dyn SpeechService>, hide_sentence: bool) -> Self {
        Self {
            speech,
            sentences: REPEAT_SENTENCES.iter().map(|s| (*s).to_owned()).collect(),
            hide_sentence,
            capture_deadline: SessionTiming::default().capture_deadline,
            rng: StdRng::from_os_rng(),
            round: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_sentences<I, S>(mut self, sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentences = sentences.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn hides_sentence(&self) -> bool {
        self.hide_sentence
    }

    /// Applies to the next round.
    pub fn set_hide_sentence(&mut self, hide: bool) {
        self.hide_sentence = hide;
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

    /// Pick a sentence and speak it.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NothingToPick` when there are no sentences.
    pub fn new_round(&mut self) -> Result<&GameRound, GameError> {
        if self.sentences.is_empty() {
            return Err(GameError::NothingToPick);
        }
        let pick = self.rng.random_range(0..self.sentences.len());
        let sentence = self.sentences[pick].clone();
        tracing::info!(%sentence, hidden = self.hide_sentence, "new repeat round");
        self.speech.speak(&sentence);
        Ok(&*self
            .round
            .insert(GameRound::repeat(sentence, self.hide_sentence)))
    }

    /// Speak the current sentence again.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoRound` before the first round.
    pub fn replay(&self) -> Result<(), GameError> {
        let round = self.round.as_ref().ok_or(GameError::NoRound)?;
        if let RoundTarget::Repeat { sentence, .. } = round.target() {
            self.speech.speak(sentence);
        }
        Ok(())
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

    /// Score a finished capture against the spoken sentence.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoRound` or a round error if no capture was begun.
    pub fn complete_listen(&mut self, capture: CaptureResult) -> Result<&GameRound, GameError> {
        let round = self.round.as_mut().ok_or(GameError::NoRound)?;
        let (outcome, feedback) = match capture.transcript {
            None => (None, NOT_UNDERSTOOD.to_owned()),
            Some(transcript) => {
                let RoundTarget::Repeat { sentence, .. } = round.target() else {
                    return Err(GameError::NoRound);
                };
                let score = judge_repeat(sentence, &transcript);
                tracing::info!(%transcript, percent = score.percent, "repeat scored");
                (
                    Some(RoundOutcome::Scored {
                        percent: score.percent,
                    }),
                    score.feedback(&transcript),
                )
            }
        };
        round.finish_capture(outcome, feedback)?;
        Ok(&*round)
    }

    /// Listen once and score the attempt.
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

#[cfg(test)]
mod tests {
    use buddy_core::model::HIDDEN_SENTENCE;

    use super::*;
    use crate::speech::{ScriptedCapture, ScriptedSpeechService};

    const FOX: &str = "The quick brown fox jumps over the lazy dog.";

    fn game(speech: &ScriptedSpeechService, hidden: bool) -> RepeatGame {
        RepeatGame::new(Arc::new(speech.clone()), hidden)
            .with_sentences([FOX])
            .with_seed(3)
    }

    #[tokio::test]
    async fn exact_repeat_without_punctuation_scores_full_marks() {
        let speech = ScriptedSpeechService::new([ScriptedCapture::transcript(
            "the quick brown fox jumps over the lazy dog",
        )]);
        let mut game = game(&speech, false);
        game.new_round().unwrap();
        assert_eq!(speech.spoken(), vec![FOX]);

        let round = game.listen().await.unwrap();
        assert_eq!(round.outcome(), &RoundOutcome::Scored { percent: 100 });
        assert_eq!(
            round.feedback(),
            "Recognized: 'the quick brown fox jumps over the lazy dog' - similarity 100%"
        );
    }

    #[tokio::test]
    async fn hidden_sentence_is_revealed_after_an_attempt() {
        let speech = ScriptedSpeechService::new([
            ScriptedCapture::Answer(CaptureResult::absent()),
            ScriptedCapture::transcript("a quick fox"),
        ]);
        let mut game = game(&speech, true);
        game.new_round().unwrap();
        assert_eq!(game.round().unwrap().display_text(), HIDDEN_SENTENCE);

        let round = game.listen().await.unwrap();
        assert_eq!(round.display_text(), HIDDEN_SENTENCE);
        assert_eq!(round.feedback(), NOT_UNDERSTOOD);

        let round = game.listen().await.unwrap();
        assert_eq!(round.display_text(), FOX);
        let RoundOutcome::Scored { percent } = round.outcome() else {
            panic!("expected a score");
        };
        assert!(*percent < 100);
    }

    #[tokio::test]
    async fn replay_speaks_the_sentence_again() {
        let speech = ScriptedSpeechService::default();
        let mut game = game(&speech, true);
        assert!(matches!(game.replay(), Err(GameError::NoRound)));
        game.new_round().unwrap();
        game.replay().unwrap();
        assert_eq!(speech.spoken(), vec![FOX, FOX]);
    }

    #[tokio::test]
    async fn no_sentences_means_no_round() {
        let speech = ScriptedSpeechService::default();
        let mut game = RepeatGame::new(Arc::new(speech), false).with_sentences(Vec::<String>::new());
        assert!(matches!(game.new_round(), Err(GameError::NothingToPick)));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_capture_ends_at_the_deadline() {
        let speech = ScriptedSpeechService::new([ScriptedCapture::Hang]);
        let mut game = game(&speech, true).with_capture_deadline(Duration::from_secs(5));
        game.new_round().unwrap();

        let started = tokio::time::Instant::now();
        let round = game.listen().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(round.outcome(), &RoundOutcome::Unscored);
        assert_eq!(round.display_text(), HIDDEN_SENTENCE);
        assert!(!round.is_capture_in_flight());
    }

    #[tokio::test]
    async fn hide_setting_applies_to_the_next_round() {
        let speech = ScriptedSpeechService::default();
        let mut game = game(&speech, true);
        game.new_round().unwrap();
        game.set_hide_sentence(false);
        assert!(!game.hides_sentence());
        assert_eq!(game.round().unwrap().display_text(), HIDDEN_SENTENCE);

        game.new_round().unwrap();
        assert_eq!(game.round().unwrap().display_text(), FOX);
    }

    #[tokio::test]
    async fn concurrent_listen_is_rejected() {
        let speech = ScriptedSpeechService::default();
        let mut game = game(&speech, false);
        game.new_round().unwrap();
        let _running = game.begin_listen().unwrap();
        assert!(matches!(game.begin_listen(), Err(GameError::CaptureInFlight)));
    }
}
