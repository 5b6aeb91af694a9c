use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use buddy_core::model::CaptureResult;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use super::SpeechService;
use super::synth::SystemSynthesizer;

/// Text-only stand-in for voice: prompts go to stdout and answers are typed.
///
/// One stdin reader is shared between captures and the command loop so
/// buffered input is never lost between them.
#[derive(Clone)]
pub struct ConsoleSpeechService {
    input: Arc<Mutex<Lines<BufReader<Stdin>>>>,
}

impl Default for ConsoleSpeechService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSpeechService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
        }
    }

    /// Next typed line, or `None` at end of input.
    pub async fn read_line(&self) -> Option<String> {
        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "could not read from stdin");
                None
            }
        }
    }
}

#[async_trait]
impl SpeechService for ConsoleSpeechService {
    fn speak(&self, text: &str) {
        println!("Buddy: {text}");
    }

    async fn capture(&self) -> CaptureResult {
        print!("> ");
        let _ = std::io::stdout().flush();
        let transcript = self.read_line().await;
        CaptureResult::new(transcript, None)
    }

    fn backend_name(&self) -> &'static str {
        "console"
    }
}

/// Prompts are printed and spoken aloud; answers are still typed.
#[derive(Clone)]
pub struct SpokenConsoleService {
    console: ConsoleSpeechService,
    synth: SystemSynthesizer,
}

impl SpokenConsoleService {
    #[must_use]
    pub fn new(console: ConsoleSpeechService, synth: SystemSynthesizer) -> Self {
        Self { console, synth }
    }
}

#[async_trait]
impl SpeechService for SpokenConsoleService {
    fn speak(&self, text: &str) {
        self.console.speak(text);
        self.synth.speak(text);
    }

    async fn capture(&self) -> CaptureResult {
        self.console.capture().await
    }

    fn backend_name(&self) -> &'static str {
        "spoken-console"
    }
}
