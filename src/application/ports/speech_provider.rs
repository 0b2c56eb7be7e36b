use async_trait::async_trait;

/// One speech-to-text backend in the fallback chain.
///
/// Providers receive already-normalized single-channel WAV audio and return
/// the raw transcript. Empty transcripts are treated by the caller as a
/// miss, not an error.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, wav_audio: &[u8]) -> Result<String, SpeechProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechProviderError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("could not understand audio")]
    Unintelligible,
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
