//! Runtime configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Delays that pace a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Pause between speaking a prompt and starting to listen.
    pub settle: Duration,
    /// Pause between recording an answer and asking the next prompt.
    pub pacing: Duration,
    /// Hard limit on one capture attempt, transcription included.
    pub capture_deadline: Duration,
}

impl SessionTiming {
    /// No waiting at all; capture deadline kept generous.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            pacing: Duration::ZERO,
            capture_deadline: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_capture_deadline(mut self, deadline: Duration) -> Self {
        self.capture_deadline = deadline;
        self
    }
}

impl Default for SessionTiming {
    fn default() -> Self {
        let capture = CaptureConfig::default();
        Self {
            settle: Duration::from_millis(1_500),
            pacing: Duration::from_millis(1_000),
            capture_deadline: capture.deadline(),
        }
    }
}

/// Time reserved for encoding and saving a phrase before transcription starts.
pub const SAVE_MARGIN: Duration = Duration::from_secs(1);

/// Microphone listening limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// How long to wait for the speaker to start.
    pub start_timeout: Duration,
    /// Longest phrase recorded once speech started.
    pub phrase_limit: Duration,
    /// Ambient noise sampled before listening to set the speech threshold.
    pub ambient_calibration: Duration,
    /// Silence that ends a phrase early.
    pub trailing_silence: Duration,
    /// Allowance for the transcription round trip.
    pub transcription_allowance: Duration,
    /// Speech must be this many times louder than the ambient level.
    pub energy_ratio: f32,
}

impl CaptureConfig {
    /// Everything one voice capture may take: calibration, start timeout,
    /// phrase limit, saving, then the transcription allowance.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.ambient_calibration
            + self.start_timeout
            + self.phrase_limit
            + SAVE_MARGIN
            + self.transcription_allowance
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_secs(3),
            phrase_limit: Duration::from_secs(4),
            ambient_calibration: Duration::from_millis(500),
            trailing_silence: Duration::from_millis(800),
            transcription_allowance: Duration::from_secs(10),
            energy_ratio: 1.5,
        }
    }
}

/// Cloud transcription endpoint (OpenAI compatible).
#[derive(Clone, Debug)]
pub struct TranscriptionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl TranscriptionConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("BUDDY_STT_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("BUDDY_STT_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("BUDDY_STT_MODEL").unwrap_or_else(|_| "whisper-1".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Speech synthesis through a system program such as `espeak` or `say`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtsConfig {
    pub program: String,
    /// Words per minute.
    pub rate: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        let program = if cfg!(target_os = "macos") { "say" } else { "espeak" };
        Self {
            program: program.to_owned(),
            rate: 160,
        }
    }
}

/// Everything the binary needs to assemble services.
#[derive(Clone, Debug)]
pub struct BuddyConfig {
    pub recordings_dir: PathBuf,
    pub lexicon_path: Option<PathBuf>,
    pub console: bool,
    pub timing: SessionTiming,
    pub capture: CaptureConfig,
    pub tts: TtsConfig,
    pub transcription: Option<TranscriptionConfig>,
}

impl Default for BuddyConfig {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from("recordings"),
            lexicon_path: None,
            console: false,
            timing: SessionTiming::default(),
            capture: CaptureConfig::default(),
            tts: TtsConfig::default(),
            transcription: None,
        }
    }
}

impl BuddyConfig {
    /// Read `BUDDY_*` variables, falling back to defaults for anything unset
    /// or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = non_empty_var("BUDDY_RECORDINGS_DIR") {
            config.recordings_dir = PathBuf::from(dir);
        }
        config.lexicon_path = non_empty_var("BUDDY_LEXICON").map(PathBuf::from);
        if let Some(program) = non_empty_var("BUDDY_TTS_PROGRAM") {
            config.tts.program = program;
        }
        if let Some(rate) = parse_var::<u32>("BUDDY_TTS_RATE") {
            config.tts.rate = rate;
        }
        if let Some(secs) = parse_var::<u64>("BUDDY_CAPTURE_START_SECS") {
            config.capture.start_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>("BUDDY_PHRASE_SECS") {
            config.capture.phrase_limit = Duration::from_secs(secs);
        }
        config.timing.capture_deadline = config.capture.deadline();
        config.transcription = TranscriptionConfig::from_env();
        config
    }

    /// Typed answers take longer than spoken ones.
    #[must_use]
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        if console {
            self.timing.capture_deadline = self.timing.capture_deadline.max(Duration::from_secs(120));
        }
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_deadline_covers_listen_and_transcribe() {
        let capture = CaptureConfig::default();
        assert_eq!(capture.deadline(), Duration::from_millis(18_500));
        assert_eq!(SessionTiming::default().capture_deadline, capture.deadline());
    }

    #[test]
    fn console_mode_extends_deadline() {
        let config = BuddyConfig::default().with_console(true);
        assert!(config.console);
        assert_eq!(config.timing.capture_deadline, Duration::from_secs(120));
    }
}
