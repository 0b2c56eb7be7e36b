use std::path::Path;

use async_trait::async_trait;

/// Normalizes an audio file into the single-channel WAV format the speech
/// providers accept.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Read the file at `path` and return provider-ready WAV bytes,
    /// converting from other container formats when necessary. Any
    /// intermediate file must be cleaned up on every exit path.
    async fn to_provider_wav(&self, path: &Path) -> Result<Vec<u8>, AudioConversionError>;

    /// Audio duration in seconds, or `None` when it cannot be determined.
    async fn duration_seconds(&self, path: &Path) -> Option<f64>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioConversionError {
    #[error("failed to read audio file: {0}")]
    ReadFailed(String),
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("audio encoding failed: {0}")]
    EncodingFailed(String),
}
