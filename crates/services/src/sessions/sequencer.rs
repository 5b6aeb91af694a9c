use std::sync::Arc;

use buddy_core::catalog::SESSION_COMPLETE_LINE;
use buddy_core::model::{PromptList, SessionState, TranscriptRecord};
use tokio::sync::mpsc::UnboundedSender;

use super::events::SessionEvent;
use crate::Clock;
use crate::config::SessionTiming;
use crate::error::SessionError;
use crate::speech::{SpeechService, capture_within};

/// Result of one `advance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A prompt was asked and its outcome recorded.
    Recorded(TranscriptRecord),
    /// Nothing left to ask.
    Completed,
}

//
// ─── SEQUENCER ─────────────────────────────────────────────────────────────────
//

/// Walks a prompt list one prompt at a time: speak, settle, capture, record.
///
/// The sequencer is the only owner of `SessionState`. Captures run on a
/// spawned task under a deadline, and whatever comes back (including nothing)
/// is recorded before the index moves on. `advance` takes `&mut self`, so two
/// captures for the same session can never overlap.
pub struct SessionSequencer {
    speech: Arc<dyn SpeechService>,
    timing: SessionTiming,
    clock: Clock,
    events: Option<UnboundedSender<SessionEvent>>,
    state: Option<SessionState>,
    closing_spoken: bool,
}

impl SessionSequencer {
    #[must_use]
    pub fn new(speech: Arc<dyn SpeechService>, timing: SessionTiming, clock: Clock) -> Self {
        Self {
            speech,
            timing,
            clock,
            events: None,
            state: None,
            closing_spoken: false,
        }
    }

    /// Send progress events to `events`. A dropped receiver is ignored.
    #[must_use]
    pub fn with_events(mut self, events: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Replace any previous session with a fresh one at index 0.
    pub fn start(&mut self, prompts: PromptList) {
        tracing::info!(prompts = prompts.len(), "session started");
        self.state = Some(SessionState::new(prompts));
        self.closing_spoken = false;
    }

    #[must_use]
    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.as_ref().is_some_and(SessionState::is_completed)
    }

    /// Ask the current prompt and record its outcome.
    ///
    /// At the end of the list this does nothing and reports `Completed`, no
    /// matter how often it is called.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first `start`.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        let state = self.state.as_ref().ok_or(SessionError::NotStarted)?;
        let Some(prompt) = state.current_prompt().map(str::to_owned) else {
            self.finish();
            return Ok(AdvanceOutcome::Completed);
        };
        let index = state.current_index();

        let asked_at = self.clock.now();
        tracing::debug!(index, %prompt, "asking prompt");
        self.speech.speak(&prompt);
        self.emit(SessionEvent::Asking {
            index,
            prompt,
            asked_at,
        });

        tokio::time::sleep(self.timing.settle).await;

        self.emit(SessionEvent::Listening { index });
        let capture = capture_within(Arc::clone(&self.speech), self.timing.capture_deadline).await;

        let state = self.state.as_mut().ok_or(SessionError::NotStarted)?;
        let record = state.record(asked_at, capture)?.clone();
        tracing::info!(
            index,
            answered = record.transcript.is_some(),
            saved = record.saved_path.is_some(),
            "answer recorded"
        );
        self.emit(SessionEvent::Answered(record.clone()));

        if self.is_completed() {
            self.finish();
        }
        Ok(AdvanceOutcome::Recorded(record))
    }

    /// Drive the session to completion, pausing between prompts.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before the first `start`.
    pub async fn run(&mut self) -> Result<&[TranscriptRecord], SessionError> {
        loop {
            match self.advance().await? {
                AdvanceOutcome::Completed => break,
                AdvanceOutcome::Recorded(_) => {
                    if !self.is_completed() {
                        tokio::time::sleep(self.timing.pacing).await;
                    }
                }
            }
        }
        let state = self.state.as_ref().ok_or(SessionError::NotStarted)?;
        Ok(state.transcripts())
    }

    fn finish(&mut self) {
        if self.closing_spoken {
            return;
        }
        self.closing_spoken = true;
        let answered = self.state.as_ref().map_or(0, |s| {
            s.transcripts()
                .iter()
                .filter(|r| r.transcript.is_some())
                .count()
        });
        tracing::info!(answered, "session completed");
        self.speech.speak(SESSION_COMPLETE_LINE);
        self.emit(SessionEvent::Completed { answered });
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use buddy_core::time::{fixed_clock, fixed_now};

    use super::*;
    use crate::speech::{ScriptedCapture, ScriptedSpeechService};

    fn sequencer(speech: &ScriptedSpeechService, timing: SessionTiming) -> SessionSequencer {
        SessionSequencer::new(Arc::new(speech.clone()), timing, fixed_clock())
    }

    fn prompts(items: &[&str]) -> PromptList {
        PromptList::new(items.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn two_prompts_then_completed() {
        let speech = ScriptedSpeechService::new([
            ScriptedCapture::transcript("answer one"),
            ScriptedCapture::transcript("answer two"),
        ]);
        let mut seq = sequencer(&speech, SessionTiming::immediate());
        seq.start(prompts(&["Q1", "Q2"]));

        let first = seq.advance().await.unwrap();
        let AdvanceOutcome::Recorded(record) = first else {
            panic!("expected a record");
        };
        assert_eq!(record.index, 0);
        assert_eq!(record.prompt, "Q1");
        assert_eq!(record.transcript.as_deref(), Some("answer one"));
        assert_eq!(record.asked_at, fixed_now());

        seq.advance().await.unwrap();
        let state = seq.state().unwrap().clone();
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.transcripts().len(), 2);
        assert!(seq.is_completed());

        assert_eq!(seq.advance().await.unwrap(), AdvanceOutcome::Completed);
        assert_eq!(seq.advance().await.unwrap(), AdvanceOutcome::Completed);
        assert_eq!(seq.state().unwrap(), &state);

        assert_eq!(
            speech.spoken(),
            vec!["Q1", "Q2", SESSION_COMPLETE_LINE],
            "closing line is spoken once"
        );
    }

    #[tokio::test]
    async fn speak_precedes_capture_for_each_prompt() {
        let speech = ScriptedSpeechService::default();
        let mut seq = sequencer(&speech, SessionTiming::immediate());
        seq.start(prompts(&["Q1", "Q2"]));
        seq.run().await.unwrap();

        let closing = format!("speak:{SESSION_COMPLETE_LINE}");
        assert_eq!(
            speech.log(),
            vec!["speak:Q1", "capture", "speak:Q2", "capture", closing.as_str()]
        );
    }

    #[tokio::test]
    async fn advance_before_start_is_an_error() {
        let speech = ScriptedSpeechService::default();
        let mut seq = sequencer(&speech, SessionTiming::immediate());
        assert!(matches!(seq.advance().await, Err(SessionError::NotStarted)));
    }

    #[tokio::test(start_paused = true)]
    async fn capture_timeout_records_absent_and_continues() {
        let speech = ScriptedSpeechService::new([
            ScriptedCapture::Hang,
            ScriptedCapture::transcript("second"),
        ]);
        let timing = SessionTiming::immediate().with_capture_deadline(Duration::from_secs(5));
        let mut seq = sequencer(&speech, timing);
        seq.start(prompts(&["Q1", "Q2"]));

        let records = seq.run().await.unwrap().to_vec();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_unanswered());
        assert_eq!(records[1].transcript.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn panicking_capture_is_a_failed_capture() {
        let speech = ScriptedSpeechService::new([ScriptedCapture::Panic]);
        let mut seq = sequencer(&speech, SessionTiming::immediate());
        seq.start(prompts(&["Q1"]));

        let AdvanceOutcome::Recorded(record) = seq.advance().await.unwrap() else {
            panic!("expected a record");
        };
        assert!(record.is_unanswered());
        assert!(seq.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn settle_and_pacing_delays_are_applied() {
        let speech = ScriptedSpeechService::default();
        let timing = SessionTiming {
            settle: Duration::from_millis(1_500),
            pacing: Duration::from_millis(1_000),
            capture_deadline: Duration::from_secs(10),
        };
        let mut seq = sequencer(&speech, timing);
        seq.start(prompts(&["Q1", "Q2"]));

        let started = tokio::time::Instant::now();
        seq.run().await.unwrap();
        // Two settles and one pacing pause between the prompts.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(4_000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(4_100), "{elapsed:?}");
    }

    #[tokio::test]
    async fn events_follow_the_session() {
        let speech = ScriptedSpeechService::new([ScriptedCapture::transcript("hi")]);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut seq = sequencer(&speech, SessionTiming::immediate()).with_events(tx);
        seq.start(prompts(&["Q1"]));
        seq.run().await.unwrap();
        drop(seq);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], SessionEvent::Asking { index: 0, prompt, .. } if prompt == "Q1"));
        assert_eq!(events[1], SessionEvent::Listening { index: 0 });
        assert!(matches!(&events[2], SessionEvent::Answered(r) if r.transcript.as_deref() == Some("hi")));
        assert_eq!(events[3], SessionEvent::Completed { answered: 1 });
    }

    #[tokio::test]
    async fn restart_resets_state() {
        let speech = ScriptedSpeechService::default();
        let mut seq = sequencer(&speech, SessionTiming::immediate());
        seq.start(prompts(&["Q1"]));
        seq.run().await.unwrap();
        assert!(seq.is_completed());

        seq.start(prompts(&["Q1", "Q2"]));
        let state = seq.state().unwrap();
        assert_eq!(state.current_index(), 0);
        assert!(state.transcripts().is_empty());
        assert!(!seq.is_completed());
    }
}
