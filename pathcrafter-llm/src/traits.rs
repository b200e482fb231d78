use async_trait::async_trait;
use pathcrafter_common::{PathcrafterError, Result};
use pathcrafter_http::HttpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("invalid API key")]
    Unauthorized,

    #[error("API access forbidden")]
    Forbidden,

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("content blocked by safety filters")]
    Blocked,

    #[error("empty response from {0}")]
    Empty(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LlmError {
    pub(crate) fn from_http(err: HttpError) -> Self {
        match err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::Unauthorized,
            Some(403) => LlmError::Forbidden,
            Some(429) => LlmError::RateLimit,
            Some(_) => LlmError::Api(err.to_string()),
            None if err.is_transport() => LlmError::Network(err.to_string()),
            None => LlmError::Api(err.to_string()),
        }
    }
}

impl From<LlmError> for PathcrafterError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Config(msg) => PathcrafterError::Config(msg),
            other => PathcrafterError::Llm(other.to_string()),
        }
    }
}

/// Default system prompt for build guides.
pub const GUIDE_SYSTEM_PROMPT: &str = "You are a veteran Path of Exile player and build \
    theorycrafter. Give practical, concrete advice for the current league: skill gems and \
    links, passive tree focus, gear priorities and defensive layers. Be honest when an item \
    is a poor fit for the requested class.";

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    fn default_system_prompt(&self) -> &str {
        GUIDE_SYSTEM_PROMPT
    }

    /// Write a build guide for an assembled prompt.
    async fn generate_guide(&self, prompt: &str) -> Result<String> {
        let system_prompt = self.default_system_prompt().to_string();
        tracing::info!(model = self.model_name(), prompt_chars = prompt.chars().count(), "llm.guide.start");
        let response = self
            .generate(prompt, Some(&system_prompt), None, Some(0.7))
            .await?;
        let text = response.text.trim();
        if text.is_empty() {
            return Err(PathcrafterError::Llm(format!(
                "{} returned an empty guide",
                self.model_name()
            )));
        }
        tracing::info!(
            model = self.model_name(),
            tokens = ?response.tokens_used,
            "llm.guide.done"
        );
        Ok(text.to_string())
    }
}
