use async_trait::async_trait;

/// Raw output of a text-generation call, kept alongside the parsed fields
/// for auditing.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub text: String,
    pub model: String,
    pub api_version: Option<String>,
}

/// Large-language-model text generation.
#[async_trait]
pub trait GenerationModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerationOutput, GenerationModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationModelError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
