//! Common types and utilities shared across Pathcrafter crates.
//!
//! This crate defines the provider-agnostic LLM configuration, observability
//! helpers, and the shared error type used throughout the workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! pulling in the HTTP or parsing stacks.
//!
//! # Overview
//!
//! - [`Provider`]: the two text-generation backends a guide can be requested from
//! - [`LlmConfig`]: provider configuration handed to `pathcrafter-llm`
//! - [`LlmSettings`]: the user-facing `llm` settings section (models, keys)
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`PathcrafterError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use pathcrafter_common::Provider;
//!
//! let provider: Provider = "gemini".parse().unwrap();
//! assert_eq!(provider, Provider::Gemini);
//! assert_eq!(provider.display_name(), "Gemini");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Text-generation backend selected for a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "ChatGPT", alias = "chatgpt", alias = "openai")]
    ChatGpt,
    #[serde(rename = "Gemini", alias = "gemini")]
    Gemini,
}

impl Provider {
    /// Name shown to the user and stored in snapshots.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::ChatGpt => "ChatGPT",
            Provider::Gemini => "Gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = PathcrafterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatgpt" | "openai" | "gpt" => Ok(Provider::ChatGpt),
            "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(PathcrafterError::Config(format!(
                "unknown LLM provider: {other}"
            ))),
        }
    }
}

/// Configuration for a single LLM provider.
///
/// Feature flags control which variants are compiled in.
/// See the `pathcrafter-llm` crate for the concrete clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmConfig {
    #[cfg(feature = "openai")]
    OpenAi {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    #[cfg(feature = "gemini")]
    Gemini {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::None
    }
}

/// Model used for ChatGPT when none is configured.
pub const DEFAULT_CHATGPT_MODEL: &str = "gpt-4o-mini";
/// Model used for Gemini when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "models/gemini-1.5-flash-latest";

/// Model ids, API keys and endpoint overrides for both providers.
///
/// Blank strings are treated as unset: a blank model id falls back to the
/// default and a blank key counts as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub chatgpt_model: String,
    pub gemini_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_base_url: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            chatgpt_model: DEFAULT_CHATGPT_MODEL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_api_key: None,
            gemini_api_key: None,
            openai_base_url: None,
            gemini_base_url: None,
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl LlmSettings {
    pub fn model_for(&self, provider: Provider) -> &str {
        let (configured, fallback) = match provider {
            Provider::ChatGpt => (&self.chatgpt_model, DEFAULT_CHATGPT_MODEL),
            Provider::Gemini => (&self.gemini_model, DEFAULT_GEMINI_MODEL),
        };
        non_blank(Some(configured)).unwrap_or(fallback)
    }

    pub fn api_key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::ChatGpt => non_blank(self.openai_api_key.as_ref()),
            Provider::Gemini => non_blank(self.gemini_api_key.as_ref()),
        }
    }

    pub fn base_url_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::ChatGpt => non_blank(self.openai_base_url.as_ref()),
            Provider::Gemini => non_blank(self.gemini_base_url.as_ref()),
        }
    }

    /// Providers that cannot be used because their key is missing.
    pub fn missing_api_keys(&self) -> Vec<Provider> {
        [Provider::ChatGpt, Provider::Gemini]
            .into_iter()
            .filter(|p| self.api_key_for(*p).is_none())
            .collect()
    }

    /// Replace blank model ids with the defaults.
    pub fn with_default_models(mut self) -> Self {
        self.chatgpt_model = self.model_for(Provider::ChatGpt).to_string();
        self.gemini_model = self.model_for(Provider::Gemini).to_string();
        self
    }
}

/// Error types used across the Pathcrafter workspace.
#[derive(thiserror::Error, Debug)]
pub enum PathcrafterError {
    /// A text-generation backend failed or returned something unusable.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other failure bubbled up from a collaborator.
    #[error("{0}")]
    Other(#[from] anyhow::Error),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`PathcrafterError`].
pub type Result<T> = std::result::Result<T, PathcrafterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_common_spellings() {
        assert_eq!("ChatGPT".parse::<Provider>().unwrap(), Provider::ChatGpt);
        assert_eq!(" openai ".parse::<Provider>().unwrap(), Provider::ChatGpt);
        assert_eq!("GEMINI".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("claude".parse::<Provider>().is_err());
    }

    #[test]
    fn provider_serializes_with_display_name() {
        let json = serde_json::to_string(&Provider::ChatGpt).unwrap();
        assert_eq!(json, "\"ChatGPT\"");
        let back: Provider = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(back, Provider::Gemini);
    }

    #[test]
    fn blank_settings_fall_back_to_defaults() {
        let settings = LlmSettings {
            chatgpt_model: "   ".into(),
            gemini_model: String::new(),
            openai_api_key: Some(" ".into()),
            gemini_api_key: Some("g-key".into()),
            ..LlmSettings::default()
        };
        assert_eq!(settings.model_for(Provider::ChatGpt), DEFAULT_CHATGPT_MODEL);
        assert_eq!(settings.model_for(Provider::Gemini), DEFAULT_GEMINI_MODEL);
        assert_eq!(settings.api_key_for(Provider::ChatGpt), None);
        assert_eq!(settings.api_key_for(Provider::Gemini), Some("g-key"));
        assert_eq!(settings.missing_api_keys(), vec![Provider::ChatGpt]);

        let normalized = settings.with_default_models();
        assert_eq!(normalized.chatgpt_model, DEFAULT_CHATGPT_MODEL);
    }

    #[test]
    fn settings_deserialize_partially() {
        let settings: LlmSettings =
            serde_json::from_str(r#"{"chatgpt_model":"gpt-4.1"}"#).unwrap();
        assert_eq!(settings.chatgpt_model, "gpt-4.1");
        assert_eq!(settings.gemini_model, DEFAULT_GEMINI_MODEL);
        assert!(settings.openai_api_key.is_none());
    }
}
