use async_trait::async_trait;
use pathcrafter_common::observability::{LogConfig, LoggingSettings};
use pathcrafter_common::{PathcrafterError, Result};
use pathcrafter_llm::traits::{LlmClient, LlmResponse};
use pathcrafter_poedb::{ItemRecord, LeagueInfo, PageSource};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

#[allow(dead_code)]
pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let settings = LoggingSettings {
            stderr: true,
            filter: "debug".to_string(),
            dir: Some(std::env::temp_dir().join("pathcrafter-app-tests")),
            ..LoggingSettings::default()
        };
        let config = LogConfig::from_settings("pathcrafter-app-tests", &settings);
        pathcrafter_common::observability::init_logging(config).unwrap_or_default()
    });
}

#[allow(dead_code)]
/// Page source answering from a fixed map and recording every lookup.
#[derive(Default)]
pub struct StubPages {
    pub items: HashMap<String, ItemRecord>,
    pub league: Option<LeagueInfo>,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubPages {
    pub fn with_item(mut self, key: &str, record: ItemRecord) -> Self {
        self.items.insert(key.to_string(), record);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for StubPages {
    async fn fetch_item(&self, identifier_or_url: &str) -> Option<ItemRecord> {
        self.calls.lock().unwrap().push(identifier_or_url.to_string());
        self.items.get(identifier_or_url).cloned()
    }

    async fn fetch_current_league(&self) -> Option<LeagueInfo> {
        self.league.clone()
    }
}

#[allow(dead_code)]
/// LLM that echoes a canned guide and keeps the prompts it was sent.
pub struct StubLlm {
    pub reply: std::result::Result<String, String>,
    pub delay: Duration,
    pub prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubLlm {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::answering("")
        }
    }

    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::answering(reply)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                text: text.clone(),
                model: Some("stub-model".into()),
                tokens_used: None,
            }),
            Err(message) => Err(PathcrafterError::Llm(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

/// Drain every progress event still buffered in the channel.
#[allow(dead_code)]
pub fn percents(rx: &mut mpsc::Receiver<pathcrafter_app::Progress>) -> Vec<u8> {
    let mut out = Vec::new();
    while let Ok(p) = rx.try_recv() {
        out.push(p.percent);
    }
    out
}
