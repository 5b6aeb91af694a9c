use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use buddy_core::model::CaptureResult;

use super::SpeechService;

/// One scripted reaction to `capture`.
#[derive(Debug, Clone)]
pub enum ScriptedCapture {
    Answer(CaptureResult),
    /// Answer after a delay (tokio time, so paused clocks skip it).
    Delayed(Duration, CaptureResult),
    /// Never finishes; only a deadline ends it.
    Hang,
    /// The capture worker panics.
    Panic,
}

impl ScriptedCapture {
    #[must_use]
    pub fn transcript(text: &str) -> Self {
        Self::Answer(CaptureResult::new(Some(text.to_owned()), None))
    }
}

/// Deterministic speech service for tests and demos.
///
/// Captures are served from a queue; an empty queue yields absent results.
/// Every `speak` and capture start is appended to a shared log so ordering
/// can be asserted.
#[derive(Clone, Default)]
pub struct ScriptedSpeechService {
    captures: Arc<Mutex<VecDeque<ScriptedCapture>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSpeechService {
    #[must_use]
    pub fn new<I>(captures: I) -> Self
    where
        I: IntoIterator<Item = ScriptedCapture>,
    {
        Self {
            captures: Arc::new(Mutex::new(captures.into_iter().collect())),
            log: Arc::default(),
        }
    }

    pub fn push(&self, capture: ScriptedCapture) {
        if let Ok(mut queue) = self.captures.lock() {
            queue.push_back(capture);
        }
    }

    /// Log lines: `speak:<text>` and `capture`.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Texts passed to `speak`, in order.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|line| line.strip_prefix("speak:").map(str::to_owned))
            .collect()
    }

    fn record(&self, line: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(line);
        }
    }
}

#[async_trait]
impl SpeechService for ScriptedSpeechService {
    fn speak(&self, text: &str) {
        self.record(format!("speak:{text}"));
    }

    async fn capture(&self) -> CaptureResult {
        self.record("capture".to_owned());
        let next = self.captures.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            None => CaptureResult::absent(),
            Some(ScriptedCapture::Answer(result)) => result,
            Some(ScriptedCapture::Delayed(delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            Some(ScriptedCapture::Hang) => std::future::pending().await,
            Some(ScriptedCapture::Panic) => panic!("scripted capture failure"),
        }
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
