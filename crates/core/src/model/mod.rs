mod capture;
mod prompt;
mod round;
mod session;

pub use capture::{CaptureResult, RecordedPhrase};
pub use prompt::{PromptError, PromptList};
pub use round::{GameRound, HIDDEN_SENTENCE, RoundError, RoundOutcome, RoundTarget};
pub use session::{SessionState, SessionStateError, TranscriptRecord};
