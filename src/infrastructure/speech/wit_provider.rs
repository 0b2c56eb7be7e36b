use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{SpeechProvider, SpeechProviderError};

const DEFAULT_BASE_URL: &str = "https://api.wit.ai";
const API_VERSION: &str = "20230215";

/// Wit.ai speech endpoint: raw WAV body, bearer-token auth.
pub struct WitSpeechProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct WitResponse {
    text: Option<String>,
    // Older API versions used "_text".
    #[serde(rename = "_text")]
    legacy_text: Option<String>,
}

impl WitSpeechProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
        }
    }
}

#[async_trait]
impl SpeechProvider for WitSpeechProvider {
    fn name(&self) -> &str {
        "Wit.ai"
    }

    async fn recognize(&self, wav_audio: &[u8]) -> Result<String, SpeechProviderError> {
        if self.api_key.is_empty() {
            return Err(SpeechProviderError::MissingCredentials(
                "WIT_AI_KEY not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/speech?v={}",
            self.base_url.trim_end_matches('/'),
            API_VERSION
        );

        tracing::debug!(bytes = wav_audio.len(), "Sending audio to Wit.ai");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "audio/wav")
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

        // The streaming endpoint may return several concatenated JSON
        // objects; the last complete one holds the final transcript.
        let parsed: WitResponse = serde_json::from_str(&body)
            .or_else(|_| {
                let last_chunk = body
                    .rfind("\r\n{")
                    .or_else(|| body.rfind("\n{"))
                    .and_then(|idx| body.get(idx..))
                    .map(str::trim)
                    .unwrap_or(&body);
                serde_json::from_str(last_chunk)
            })
            .map_err(|e| SpeechProviderError::InvalidResponse(format!("parse: {}", e)))?;

        let text = parsed.text.or(parsed.legacy_text).unwrap_or_default();
        tracing::info!(chars = text.len(), "Wit.ai transcription completed");

        Ok(text.trim().to_string())
    }
}
