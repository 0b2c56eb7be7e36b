use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;

use crate::application::ports::{AudioConversionError, AudioConverter};

use super::decoder::{decode_to_mono_pcm, TARGET_SAMPLE_RATE};

/// Normalizes uploaded audio to 16kHz mono WAV for the speech providers.
///
/// WAV input passes through untouched; other containers are decoded and
/// resampled on a blocking worker, then re-encoded through a scoped
/// temporary file that is removed on every exit path.
pub struct SymphoniaConverter;

#[async_trait]
impl AudioConverter for SymphoniaConverter {
    async fn to_provider_wav(&self, path: &Path) -> Result<Vec<u8>, AudioConversionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AudioConversionError::ReadFailed(e.to_string()))?;

        if extension == "wav" {
            return Ok(data);
        }

        tracing::debug!(from = %extension, "Converting audio to provider WAV format");

        tokio::task::spawn_blocking(move || {
            let samples = decode_to_mono_pcm(&data)?;
            encode_wav_via_tempfile(&samples)
        })
        .await
        .map_err(|e| AudioConversionError::DecodingFailed(format!("conversion task: {}", e)))?
    }

    async fn duration_seconds(&self, path: &Path) -> Option<f64> {
        let data = tokio::fs::read(path).await.ok()?;

        tokio::task::spawn_blocking(move || {
            // WAV headers are cheap to read; anything else needs a decode.
            if let Ok(reader) = hound::WavReader::new(Cursor::new(&data)) {
                let spec = reader.spec();
                if spec.sample_rate > 0 {
                    let frames = reader.duration() as f64;
                    return Some(round2(frames / spec.sample_rate as f64));
                }
            }

            let samples = decode_to_mono_pcm(&data).ok()?;
            Some(round2(samples.len() as f64 / TARGET_SAMPLE_RATE as f64))
        })
        .await
        .ok()?
    }
}

fn encode_wav_via_tempfile(samples: &[f32]) -> Result<Vec<u8>, AudioConversionError> {
    let temp = tempfile::Builder::new()
        .prefix("ecoreport-audio-")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| AudioConversionError::EncodingFailed(format!("tempfile: {}", e)))?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(temp.path(), spec)
        .map_err(|e| AudioConversionError::EncodingFailed(format!("wav writer: {}", e)))?;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| AudioConversionError::EncodingFailed(format!("wav sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioConversionError::EncodingFailed(format!("wav finalize: {}", e)))?;

    // The temp file is deleted when `temp` drops, on success and error alike.
    std::fs::read(temp.path())
        .map_err(|e| AudioConversionError::EncodingFailed(format!("read converted wav: {}", e)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
