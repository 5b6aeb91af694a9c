//! WAV encoding for captured answers.

use std::io::Cursor;

use buddy_core::model::RecordedPhrase;
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::repository::StorageError;

/// Sample rate used for captured speech (16 kHz mono).
pub const SPEECH_SAMPLE_RATE: u32 = 16_000;

fn encoding(err: hound::Error) -> StorageError {
    StorageError::Encoding(err.to_string())
}

/// Full-scale 16-bit PCM; anything outside `[-1.0, 1.0]` is clipped.
#[allow(clippy::cast_possible_truncation)]
fn pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

/// Encode a recorded phrase as a mono 16-bit WAV file in memory.
///
/// # Errors
///
/// Returns `StorageError::Encoding` for a zero sample rate or if the writer fails.
pub fn encode_phrase(phrase: &RecordedPhrase) -> Result<Vec<u8>, StorageError> {
    if phrase.sample_rate == 0 {
        return Err(StorageError::Encoding("sample rate is zero".into()));
    }
    let spec = WavSpec {
        channels: 1,
        sample_rate: phrase.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut out = Cursor::new(Vec::with_capacity(44 + phrase.samples.len() * 2));
    let mut writer = WavWriter::new(&mut out, spec).map_err(encoding)?;
    let mut pcm = writer.get_i16_writer(u32::try_from(phrase.samples.len()).map_err(|_| {
        StorageError::Encoding(format!("{} samples do not fit a WAV file", phrase.samples.len()))
    })?);
    for &sample in &phrase.samples {
        pcm.write_sample(pcm16(sample));
    }
    pcm.flush().map_err(encoding)?;
    writer.finalize().map_err(encoding)?;
    Ok(out.into_inner())
}
