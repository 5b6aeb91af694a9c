//! Synonym and repeat-sentence game loops.
//!
//! Each game owns at most one `GameRound`. `listen` is `begin_listen`, one
//! capture, then `complete_listen`; callers that run the capture elsewhere
//! use the two halves directly and a second `begin_listen` is rejected until
//! the first completes. `listen` runs the capture under the same deadline as a
//! practice session.

mod repeat;
mod synonym;

use buddy_core::model::GameRound;

pub use crate::error::GameError;
pub use repeat::RepeatGame;
pub use synonym::SynonymGame;

/// Feedback when a capture came back without a transcript.
pub const NOT_UNDERSTOOD: &str = "Could not understand your answer. Please try again.";

/// Frees the round's capture slot when a `listen` future is dropped before
/// its capture reports back.
struct ListenGuard<'a> {
    round: &'a mut Option<GameRound>,
    armed: bool,
}

impl<'a> ListenGuard<'a> {
    fn new(round: &'a mut Option<GameRound>) -> Self {
        Self { round, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ListenGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(round) = self.round.as_mut() {
            tracing::debug!("listen abandoned; capture slot released");
            round.abandon_capture();
        }
    }
}
