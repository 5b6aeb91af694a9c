use std::path::Path;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Mutex;

use crate::config::TtsConfig;

/// Speaks through a system speech program (`espeak`, `say`).
///
/// Each utterance runs on its own task; a shared turn lock keeps them in the
/// order they were requested.
#[derive(Clone, Debug)]
pub struct SystemSynthesizer {
    config: TtsConfig,
    turn: Arc<Mutex<()>>,
}

impl SystemSynthesizer {
    #[must_use]
    pub fn new(config: TtsConfig) -> Self {
        Self {
            config,
            turn: Arc::new(Mutex::new(())),
        }
    }

    /// Program arguments for one utterance.
    #[must_use]
    pub fn args_for(&self, text: &str) -> Vec<String> {
        let program = Path::new(&self.config.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let rate_flag = if program == "say" { "-r" } else { "-s" };
        vec![
            rate_flag.to_owned(),
            self.config.rate.to_string(),
            text.to_owned(),
        ]
    }

    /// Fire and forget. Failures are logged, never returned.
    pub fn speak(&self, text: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("speech requested outside the runtime; skipped");
            return;
        };

        let program = self.config.program.clone();
        let args = self.args_for(text);
        let turn = Arc::clone(&self.turn);
        let text = text.to_owned();
        handle.spawn(async move {
            let _turn = turn.lock().await;
            tracing::debug!(%program, %text, "speaking");
            match Command::new(&program).args(&args).status().await {
                Ok(status) if status.success() => {}
                Ok(status) => tracing::warn!(%program, %status, "speech program failed"),
                Err(err) => tracing::warn!(%program, error = %err, "could not start speech program"),
            }
        });
    }
}
