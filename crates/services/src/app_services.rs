use std::sync::Arc;

use buddy_core::scoring::SynonymResolver;
use storage::{RecordingStore, Storage};

use crate::Clock;
use crate::config::BuddyConfig;
use crate::error::AppServicesError;
use crate::games::{RepeatGame, SynonymGame};
use crate::lexicon::select_resolver;
use crate::sessions::SessionSequencer;
use crate::speech::{ConsoleSpeechService, SpeechService, SystemSynthesizer};

/// Assembles app-facing services from configuration.
///
/// Everything the binary touches is reached through this value; there are no
/// process-wide singletons.
#[derive(Clone)]
pub struct AppServices {
    config: BuddyConfig,
    clock: Clock,
    storage: Storage,
    speech: Arc<dyn SpeechService>,
    input: ConsoleSpeechService,
    resolver: Arc<dyn SynonymResolver>,
}

impl AppServices {
    /// Build services backed by the recordings directory in `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the recordings directory cannot be created.
    pub fn from_config(config: BuddyConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::filesystem(&config.recordings_dir, clock)?;
        let input = ConsoleSpeechService::new();
        let speech = build_speech(&config, &storage, &input);
        let resolver = select_resolver(config.lexicon_path.as_deref());
        tracing::info!(
            recordings = %config.recordings_dir.display(),
            synonyms = resolver.backend_name(),
            speech = speech.backend_name(),
            "services ready"
        );
        Ok(Self {
            config,
            clock,
            storage,
            speech,
            input,
            resolver,
        })
    }

    /// Build services from ready-made parts.
    #[must_use]
    pub fn from_parts(
        config: BuddyConfig,
        clock: Clock,
        storage: Storage,
        speech: Arc<dyn SpeechService>,
        resolver: Arc<dyn SynonymResolver>,
    ) -> Self {
        Self {
            config,
            clock,
            storage,
            speech,
            input: ConsoleSpeechService::new(),
            resolver,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BuddyConfig {
        &self.config
    }

    #[must_use]
    pub fn speech(&self) -> Arc<dyn SpeechService> {
        Arc::clone(&self.speech)
    }

    /// Typed command input, shared with console answers.
    #[must_use]
    pub fn input(&self) -> &ConsoleSpeechService {
        &self.input
    }

    #[must_use]
    pub fn recordings(&self) -> Arc<dyn RecordingStore> {
        Arc::clone(&self.storage.recordings)
    }

    #[must_use]
    pub fn resolver(&self) -> Arc<dyn SynonymResolver> {
        Arc::clone(&self.resolver)
    }

    #[must_use]
    pub fn sequencer(&self) -> SessionSequencer {
        SessionSequencer::new(self.speech(), self.config.timing, self.clock)
    }

    #[must_use]
    pub fn synonym_game(&self) -> SynonymGame {
        SynonymGame::new(self.speech(), self.resolver())
            .with_capture_deadline(self.config.timing.capture_deadline)
    }

    #[must_use]
    pub fn repeat_game(&self, hide_sentence: bool) -> RepeatGame {
        RepeatGame::new(self.speech(), hide_sentence)
            .with_capture_deadline(self.config.timing.capture_deadline)
    }
}

/// `--console` prints only; otherwise prompts are spoken and answers come from
/// the microphone when compiled in, or are typed.
fn build_speech(
    config: &BuddyConfig,
    storage: &Storage,
    input: &ConsoleSpeechService,
) -> Arc<dyn SpeechService> {
    if config.console {
        return Arc::new(input.clone());
    }
    let synth = SystemSynthesizer::new(config.tts.clone());
    voice_or_typed(config, storage, input, synth)
}

#[cfg(feature = "microphone")]
fn voice_or_typed(
    config: &BuddyConfig,
    storage: &Storage,
    _input: &ConsoleSpeechService,
    synth: SystemSynthesizer,
) -> Arc<dyn SpeechService> {
    use crate::speech::{Microphone, VoiceSpeechService};

    Arc::new(
        VoiceSpeechService::new(
            synth,
            Arc::new(Microphone::new(config.capture)),
            Arc::clone(&storage.recordings),
            build_transcriber(config),
        )
        .with_transcription_allowance(config.capture.transcription_allowance),
    )
}

#[cfg(not(feature = "microphone"))]
fn voice_or_typed(
    config: &BuddyConfig,
    _storage: &Storage,
    input: &ConsoleSpeechService,
    synth: SystemSynthesizer,
) -> Arc<dyn SpeechService> {
    use crate::speech::SpokenConsoleService;

    if config.transcription.is_some() {
        tracing::warn!("built without microphone support; transcription is unused");
    }
    tracing::info!("built without microphone support; answers are typed");
    Arc::new(SpokenConsoleService::new(input.clone(), synth))
}

/// The HTTP timeout matches the allowance so a slow service gives up before
/// the capture deadline and the saved file is still reported.
#[cfg(feature = "microphone")]
fn build_transcriber(config: &BuddyConfig) -> Option<Arc<dyn crate::speech::Transcriber>> {
    use crate::speech::{CloudTranscriber, Transcriber};

    let transcription = config.transcription.clone()?;
    match CloudTranscriber::new(transcription, config.capture.transcription_allowance) {
        Ok(transcriber) => Some(Arc::new(transcriber) as Arc<dyn Transcriber>),
        Err(err) => {
            tracing::warn!(error = %err, "could not set up transcription");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use buddy_core::time::fixed_clock;

    use super::*;

    #[tokio::test]
    async fn builds_from_config_with_fallback_synonyms() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuddyConfig {
            recordings_dir: dir.path().join("recordings"),
            ..BuddyConfig::default()
        }
        .with_console(true);

        let services = AppServices::from_config(config, fixed_clock()).unwrap();
        assert!(dir.path().join("recordings").is_dir());
        assert_eq!(services.resolver().backend_name(), "fallback");
        assert!(services.recordings().list().await.unwrap().is_empty());
        assert_eq!(services.speech().backend_name(), "console");
    }

    #[tokio::test]
    async fn prompts_are_spoken_unless_console_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuddyConfig {
            recordings_dir: dir.path().to_path_buf(),
            ..BuddyConfig::default()
        };

        let services = AppServices::from_config(config, fixed_clock()).unwrap();
        let expected = if cfg!(feature = "microphone") {
            "voice"
        } else {
            "spoken-console"
        };
        assert_eq!(services.speech().backend_name(), expected);
    }

    #[cfg(feature = "microphone")]
    #[test]
    fn transcriber_only_when_configured() {
        let mut config = BuddyConfig::default();
        assert!(build_transcriber(&config).is_none());

        config.transcription = Some(crate::config::TranscriptionConfig {
            base_url: "http://127.0.0.1:9/v1".into(),
            api_key: "key".into(),
            model: "whisper-1".into(),
        });
        assert!(build_transcriber(&config).is_some());
    }

    #[tokio::test]
    async fn games_inherit_the_configured_deadline() {
        let speech = crate::speech::ScriptedSpeechService::new([
            crate::speech::ScriptedCapture::Hang,
        ]);
        let config = BuddyConfig {
            timing: crate::config::SessionTiming::immediate()
                .with_capture_deadline(std::time::Duration::from_millis(50)),
            ..BuddyConfig::default()
        };
        let services = AppServices::from_parts(
            config,
            fixed_clock(),
            Storage::in_memory(fixed_clock()),
            Arc::new(speech),
            Arc::new(buddy_core::scoring::FallbackResolver),
        );

        let mut game = services.repeat_game(false).with_seed(1);
        game.new_round().unwrap();
        let round = game.listen().await.unwrap();
        assert_eq!(round.outcome(), &buddy_core::model::RoundOutcome::Unscored);
    }
}
