//! Text-generation backends for build guides.
//!
//! This crate exposes a common [`traits::LlmClient`] interface with two
//! provider implementations, ChatGPT (OpenAI Responses API) and Gemini.
//! Clients are built either from a [`pathcrafter_common::LlmConfig`] or from
//! the user's [`LlmSettings`] plus a selected [`Provider`].
//!
//! # Examples
//! ```no_run
//! use pathcrafter_common::{LlmSettings, Provider, Result};
//! use pathcrafter_llm::build_client;
//!
//! # fn main() -> Result<()> {
//! let settings = LlmSettings {
//!     gemini_api_key: Some("…".into()),
//!     ..LlmSettings::default()
//! };
//! let client = build_client(Provider::Gemini, &settings)?;
//! assert_eq!(client.model_name(), "models/gemini-1.5-flash-latest");
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod openai;
pub mod traits;

use gemini::GeminiClient;
use openai::OpenAiClient;
pub use pathcrafter_common::{
    DEFAULT_CHATGPT_MODEL, DEFAULT_GEMINI_MODEL, LlmConfig, LlmSettings, PathcrafterError,
    Provider,
};
use std::sync::Arc;
use traits::LlmClient;

pub type SharedLlmClient = Arc<dyn LlmClient + Send + Sync + 'static>;

pub(crate) fn with_trailing_slash(base: &str) -> String {
    let trimmed = base.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Turn a provider selection into a concrete client config.
///
/// Fails with a configuration error when the provider has no API key.
pub fn llm_config(provider: Provider, settings: &LlmSettings) -> pathcrafter_common::Result<LlmConfig> {
    let api_key = settings
        .api_key_for(provider)
        .ok_or_else(|| {
            PathcrafterError::Config(format!("{provider} API key is not configured"))
        })?
        .to_string();
    let model = settings.model_for(provider).to_string();
    let base_url = settings.base_url_for(provider).map(str::to_string);
    Ok(match provider {
        Provider::ChatGpt => LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
        },
        Provider::Gemini => LlmConfig::Gemini {
            api_key,
            model,
            base_url,
        },
    })
}

/// Build a client from a resolved [`LlmConfig`].
pub fn ensure_llm_ready(config: &LlmConfig) -> pathcrafter_common::Result<SharedLlmClient> {
    match config {
        #[cfg(feature = "gemini")]
        LlmConfig::Gemini {
            api_key,
            model,
            base_url,
        } => {
            let base = base_url.as_deref().unwrap_or(gemini::GEMINI_BASE_URL);
            let client = GeminiClient::with_base_url(api_key.clone(), model.clone(), base)?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "openai")]
        LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => {
            let base = base_url.as_deref().unwrap_or(openai::OPENAI_API_BASE);
            let client = OpenAiClient::with_base_url(api_key.clone(), model.clone(), base)?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(PathcrafterError::Config("No LLM configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(PathcrafterError::Config("LLM provider not enabled".to_string())),
    }
}

/// Client for `provider` using the model, key and endpoint from `settings`.
pub fn build_client(
    provider: Provider,
    settings: &LlmSettings,
) -> pathcrafter_common::Result<SharedLlmClient> {
    let config = llm_config(provider, settings)?;
    tracing::debug!(provider = %provider, model = settings.model_for(provider), "llm.client.build");
    ensure_llm_ready(&config)
}
