mod events;
mod sequencer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use events::SessionEvent;
pub use sequencer::{AdvanceOutcome, SessionSequencer};
