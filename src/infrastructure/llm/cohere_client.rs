use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{GenerationModel, GenerationModelError, GenerationOutput};

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const DEFAULT_MODEL: &str = "command";

/// Cohere `generate` API client used for pollution classification.
pub struct CohereClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    k: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
    meta: Option<Meta>,
}

#[derive(Deserialize)]
struct Generation {
    text: String,
}

#[derive(Deserialize)]
struct Meta {
    api_version: Option<ApiVersion>,
}

#[derive(Deserialize)]
struct ApiVersion {
    version: Option<String>,
}

impl CohereClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl GenerationModel for CohereClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationOutput, GenerationModelError> {
        let url = format!("{}/v1/generate", self.base_url.trim_end_matches('/'));

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            k: 0,
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Sending generation request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationModelError::ApiRequestFailed(format!("request: {}", e)))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationModelError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenerationModelError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationModelError::InvalidResponse(format!("parse: {}", e)))?;

        let text = parsed
            .generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or_else(|| {
                GenerationModelError::InvalidResponse("response carried no generations".to_string())
            })?;

        tracing::info!(chars = text.len(), "Generation completed");

        Ok(GenerationOutput {
            text,
            model: self.model.clone(),
            api_version: parsed.meta.and_then(|m| m.api_version).and_then(|v| v.version),
        })
    }
}
