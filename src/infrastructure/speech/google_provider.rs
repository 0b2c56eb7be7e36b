use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{SpeechProvider, SpeechProviderError};

const DEFAULT_BASE_URL: &str = "http://www.google.com";

/// Google Speech Recognition over the speech-api v2 endpoint.
///
/// The response body is a stream of JSON lines; the first non-empty
/// `result` carries the best alternative.
pub struct GoogleSpeechProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

#[derive(Deserialize)]
struct RecognizeLine {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    transcript: Option<String>,
}

impl GoogleSpeechProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            language: "en-US".to_string(),
        }
    }
}

#[async_trait]
impl SpeechProvider for GoogleSpeechProvider {
    fn name(&self) -> &str {
        "Google Speech Recognition"
    }

    async fn recognize(&self, wav_audio: &[u8]) -> Result<String, SpeechProviderError> {
        let url = format!(
            "{}/speech-api/v2/recognize?client=chromium&lang={}&key={}",
            self.base_url.trim_end_matches('/'),
            self.language,
            self.api_key,
        );

        tracing::debug!(bytes = wav_audio.len(), "Sending audio to Google Speech Recognition");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "audio/l16; rate=16000")
            .body(wav_audio.to_vec())
            .send()
            .await
            .map_err(|e| SpeechProviderError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SpeechProviderError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SpeechProviderError::ApiRequestFailed(format!("body: {}", e)))?;

        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            let parsed: RecognizeLine = serde_json::from_str(line)
                .map_err(|e| SpeechProviderError::InvalidResponse(format!("parse: {}", e)))?;

            if let Some(transcript) = parsed
                .result
                .first()
                .and_then(|r| r.alternative.first())
                .and_then(|a| a.transcript.as_deref())
            {
                tracing::info!(chars = transcript.len(), "Google transcription completed");
                return Ok(transcript.trim().to_string());
            }
        }

        Err(SpeechProviderError::Unintelligible)
    }
}
