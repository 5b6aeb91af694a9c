//! Default input device capture through `cpal`.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use buddy_core::model::RecordedPhrase;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use storage::wav::SPEECH_SAMPLE_RATE;

use super::phrase::{PhraseDetector, PhraseEvent};
use super::voice::PhraseSource;
use crate::config::CaptureConfig;
use crate::error::MicrophoneError;

/// Records one phrase at a time from the default input device.
///
/// The device is opened per phrase on a blocking thread; `cpal` streams are
/// not `Send` everywhere, so the stream never leaves that thread.
#[derive(Debug, Clone)]
pub struct Microphone {
    config: CaptureConfig,
}

impl Microphone {
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PhraseSource for Microphone {
    async fn record_phrase(&self) -> Result<Option<RecordedPhrase>, MicrophoneError> {
        let config = self.config;
        tokio::task::spawn_blocking(move || record_blocking(&config))
            .await
            .map_err(|e| MicrophoneError::Join(e.to_string()))?
    }
}

fn stream_config(device: &cpal::Device) -> Result<StreamConfig, MicrophoneError> {
    let mono_speech = device
        .supported_input_configs()
        .map_err(|e| MicrophoneError::Device(e.to_string()))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(SPEECH_SAMPLE_RATE)
                && c.max_sample_rate() >= SampleRate(SPEECH_SAMPLE_RATE)
        });
    if let Some(supported) = mono_speech {
        return Ok(supported
            .with_sample_rate(SampleRate(SPEECH_SAMPLE_RATE))
            .config());
    }

    // Fall back to whatever the device prefers and downmix.
    device
        .default_input_config()
        .map(|c| c.config())
        .map_err(|e| MicrophoneError::Device(e.to_string()))
}

fn record_blocking(config: &CaptureConfig) -> Result<Option<RecordedPhrase>, MicrophoneError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(MicrophoneError::NoDevice)?;
    let stream_config = stream_config(&device)?;
    let channels = usize::from(stream_config.channels.max(1));
    let sample_rate = stream_config.sample_rate.0;

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels,
        "microphone opened"
    );

    let (tx, rx) = mpsc::channel::<Vec<f32>>();
    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mono: Vec<f32> = if channels == 1 {
                    data.to_vec()
                } else {
                    data.chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                        .collect()
                };
                let _ = tx.send(mono);
            },
            |err| tracing::error!(error = %err, "audio capture error"),
            None,
        )
        .map_err(|e| MicrophoneError::Device(e.to_string()))?;
    stream
        .play()
        .map_err(|e| MicrophoneError::Device(e.to_string()))?;

    let mut detector = PhraseDetector::new(config, sample_rate);
    let give_up_at = Instant::now() + config.ambient_calibration + config.start_timeout + config.phrase_limit;
    while !detector.is_done() {
        if Instant::now() >= give_up_at {
            detector.close();
            break;
        }
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(chunk) => {
                if detector.push(&chunk) == PhraseEvent::Speaking {
                    tracing::trace!("speech detected");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                detector.close();
            }
        }
    }
    drop(stream);

    let state = detector.state();
    let phrase = detector.into_phrase();
    tracing::debug!(?state, samples = phrase.as_ref().map_or(0, Vec::len), "microphone closed");
    Ok(phrase.map(|samples| RecordedPhrase::new(samples, sample_rate)))
}
