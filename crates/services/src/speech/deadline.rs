use std::sync::Arc;
use std::time::Duration;

use buddy_core::model::CaptureResult;
use tokio::task::AbortHandle;

use super::SpeechService;

/// Aborts the capture task if the caller stops waiting for it.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run one capture on its own task and give up after `deadline`.
///
/// A timeout, a panicking capture, or the caller dropping this future all
/// end the capture task; the first two yield an absent result.
pub async fn capture_within(speech: Arc<dyn SpeechService>, deadline: Duration) -> CaptureResult {
    let mut task = tokio::spawn(async move { speech.capture().await });
    let _abort = AbortOnDrop(task.abort_handle());

    match tokio::time::timeout(deadline, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "capture worker failed");
            CaptureResult::absent()
        }
        Err(_) => {
            tracing::warn!(?deadline, "capture timed out");
            CaptureResult::absent()
        }
    }
}
