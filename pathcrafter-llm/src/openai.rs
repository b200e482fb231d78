use crate::traits::{LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use pathcrafter_common::{PathcrafterError, Result};
use pathcrafter_http::{Auth, HttpClient, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// ChatGPT over the OpenAI Responses API.
pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
pub struct ResponsesApiRequest {
    model: String,
    input: String,
    instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesApiResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub output: Vec<ResponseMessage>,
    pub usage: Option<ResponseUsage>,
}

/// One element in the `output` array
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ResponseContent>,
}

/// One part of the message `content`
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseUsage {
    pub total_tokens: Option<u32>,
}

impl ResponsesApiResponse {
    /// Concatenated `output_text` parts across all messages.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|msg| &msg.content)
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl OpenAiClient {
    /// Create a new client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, OPENAI_API_BASE)
    }

    /// Client against an OpenAI-compatible endpoint.
    pub fn with_base_url(api_key: String, model: String, base_url: &str) -> Result<Self> {
        let client = HttpClient::new(&crate::with_trailing_slash(base_url))
            .map_err(|e| PathcrafterError::Config(format!("invalid OpenAI base URL: {e}")))?
            .with_timeout(GENERATE_TIMEOUT);

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    async fn request(&self, req: &ResponsesApiRequest, timeout: Duration) -> Result<LlmResponse> {
        let opts = RequestOpts {
            auth: Some(Auth::Bearer(&self.api_key)),
            timeout: Some(timeout),
            ..Default::default()
        };
        let resp: ResponsesApiResponse = self
            .client
            .post_json_opts("responses", req, opts)
            .await
            .map_err(LlmError::from_http)?;

        tracing::debug!(response_id = %resp.id, status = %resp.status, "openai.response");
        let text = resp.output_text();
        if text.trim().is_empty() {
            return Err(LlmError::Empty("OpenAI").into());
        }

        Ok(LlmResponse {
            text,
            model: (!resp.model.is_empty()).then_some(resp.model),
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        tracing::debug!(model = %self.model, "openai.generate");

        let req = ResponsesApiRequest {
            model: self.model.clone(),
            input: prompt.to_string(),
            instructions: system_prompt
                .unwrap_or(self.default_system_prompt())
                .to_string(),
            max_output_tokens: max_tokens,
            temperature,
        };
        self.request(&req, GENERATE_TIMEOUT).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let req = ResponsesApiRequest {
            model: self.model.clone(),
            input: "Respond with just 'OK'".to_string(),
            instructions: "Reply tersely.".to_string(),
            max_output_tokens: Some(16),
            temperature: None,
        };
        match self.request(&req, HEALTH_TIMEOUT).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "openai.health_check.failed");
                Ok(false)
            }
        }
    }
}
