use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::{AudioConversionError, AudioConverter, SpeechProvider};

/// Extensions accepted by [`TranscriptionService::transcribe`].
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["wav", "mp3", "m4a", "flac", "webm"];

/// Service name recorded when every real provider failed.
pub const FALLBACK_SERVICE: &str = "fallback";

const FALLBACK_TRANSCRIPT: &str =
    "[unrecognized audio] No speech recognition service could transcribe this report.";

/// Converts an audio file into a transcript by trying speech providers in
/// priority order.
pub struct TranscriptionService {
    converter: Arc<dyn AudioConverter>,
    providers: Vec<Arc<dyn SpeechProvider>>,
}

#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub service: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptionMetadata {
    pub text: String,
    pub service: String,
    pub duration_seconds: Option<f64>,
    pub language: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("unsupported audio format: {extension}. Supported: wav, mp3, m4a, flac, webm")]
    UnsupportedFormat { extension: String },
    #[error("audio conversion failed: {0}")]
    ConversionFailed(String),
}

impl TranscriptionService {
    pub fn new(converter: Arc<dyn AudioConverter>, providers: Vec<Arc<dyn SpeechProvider>>) -> Self {
        Self {
            converter,
            providers,
        }
    }

    /// The configured provider chain, in priority order.
    pub fn service_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Transcribe the audio file at `path`.
    ///
    /// Missing files and unsupported extensions are hard errors, raised
    /// before any provider is contacted. Provider unavailability is not:
    /// when the whole chain fails, a clearly marked placeholder transcript
    /// is returned under the `fallback` service name so downstream stages
    /// still receive non-empty text.
    pub async fn transcribe(&self, path: &Path) -> Result<Transcription, TranscriptionError> {
        self.validate(path)?;

        let wav = self
            .converter
            .to_provider_wav(path)
            .await
            .map_err(|e| match e {
                AudioConversionError::ReadFailed(msg) => TranscriptionError::ConversionFailed(msg),
                other => TranscriptionError::ConversionFailed(other.to_string()),
            })?;

        for provider in &self.providers {
            match provider.recognize(&wav).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!(
                        provider = provider.name(),
                        chars = text.trim().len(),
                        "Transcription succeeded"
                    );
                    return Ok(Transcription {
                        text: text.trim().to_string(),
                        service: provider.name().to_string(),
                    });
                }
                Ok(_) => {
                    tracing::warn!(provider = provider.name(), "Provider returned empty transcript");
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Speech provider failed");
                }
            }
        }

        tracing::warn!("All speech providers failed, returning placeholder transcript");
        Ok(Transcription {
            text: FALLBACK_TRANSCRIPT.to_string(),
            service: FALLBACK_SERVICE.to_string(),
        })
    }

    /// Transcribe with supplementary metadata. A failed duration probe
    /// never fails the transcription itself.
    pub async fn transcribe_with_metadata(
        &self,
        path: &Path,
    ) -> Result<TranscriptionMetadata, TranscriptionError> {
        let transcription = self.transcribe(path).await?;
        let duration_seconds = self.converter.duration_seconds(path).await;

        Ok(TranscriptionMetadata {
            text: transcription.text,
            service: transcription.service,
            duration_seconds,
            language: "en-US".to_string(),
        })
    }

    fn validate(&self, path: &Path) -> Result<(), TranscriptionError> {
        if !path.exists() {
            return Err(TranscriptionError::FileNotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(TranscriptionError::UnsupportedFormat { extension });
        }

        Ok(())
    }
}
