//! Single-shot page fetching against poedb.tw.
//!
//! Each call sleeps for the politeness delay, performs exactly one GET and
//! hands the body to the [`Extractor`]. Nothing is retried or cached.

use crate::extract::{ExtractError, Extractor};
use crate::types::{ItemRecord, LeagueInfo};
use async_trait::async_trait;
use pathcrafter_http::{HttpClient, HttpError, RequestOpts};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://poedb.tw/kr/";
pub const DEFAULT_USER_AGENT: &str =
    "PathcrafterAI/0.1 (+https://github.com/ShovelMaker/poeplanner; non-commercial build planner)";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoedbSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Slept before every request.
    pub politeness_delay: Duration,
}

impl Default for PoedbSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Why a fetch produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    /// The identifier or URL could not be turned into a page URL; nothing was sent.
    #[error("cannot build a page URL from {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },
    #[error("network error for {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("no recognisable item structure at {url}")]
    StructureNotFound { url: String },
}

impl FetchFailure {
    fn from_http(url: &str, err: HttpError) -> Self {
        match err.status() {
            Some(status) => FetchFailure::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            },
            None => FetchFailure::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            },
        }
    }

    fn log(&self) {
        match self {
            FetchFailure::InvalidTarget { target, reason } => {
                tracing::warn!(target_text = %target, reason = %reason, "poedb.fetch.invalid_target")
            }
            FetchFailure::Transport { url, reason } => {
                tracing::warn!(url = %url, reason = %reason, "poedb.fetch.network_error")
            }
            FetchFailure::HttpStatus { url, status } => {
                tracing::warn!(url = %url, status = *status, "poedb.fetch.http_error")
            }
            FetchFailure::StructureNotFound { url } => {
                tracing::warn!(url = %url, "poedb.fetch.structure_not_found")
            }
        }
    }
}

/// Where item and league data come from. The guide job only sees this.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_item(&self, identifier_or_url: &str) -> Option<ItemRecord>;
    async fn fetch_current_league(&self) -> Option<LeagueInfo>;
}

#[derive(Clone)]
pub struct PoedbFetcher {
    http: HttpClient,
    extractor: Arc<Extractor>,
    politeness_delay: Duration,
}

impl PoedbFetcher {
    pub fn new(settings: &PoedbSettings) -> Result<Self, SetupError> {
        let http = HttpClient::new(&settings.base_url)?
            .with_timeout(settings.timeout)
            .with_user_agent(&settings.user_agent)?;
        Ok(Self {
            http,
            extractor: Arc::new(Extractor::new()?),
            politeness_delay: settings.politeness_delay,
        })
    }

    /// Absolute page URL for an identifier; full URLs pass through unchanged.
    pub fn target_url(&self, identifier_or_url: &str) -> Result<Url, FetchFailure> {
        let target = identifier_or_url.trim();
        self.http
            .resolve_url(target, target.starts_with("http"))
            .map_err(|e| FetchFailure::InvalidTarget {
                target: target.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get_page(&self, url: &Url) -> Result<String, FetchFailure> {
        if !self.politeness_delay.is_zero() {
            tokio::time::sleep(self.politeness_delay).await;
        }
        tracing::info!(url = %url, "poedb.fetch.start");
        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        self.http
            .get_text(url.as_str(), opts)
            .await
            .map_err(|e| FetchFailure::from_http(url.as_str(), e))
    }

    /// Like [`PageSource::fetch_item`], but keeps the failure cause.
    pub async fn fetch_item_detailed(
        &self,
        identifier_or_url: &str,
    ) -> Result<ItemRecord, FetchFailure> {
        let url = self.target_url(identifier_or_url)?;
        let html = self.get_page(&url).await?;
        let record = self
            .extractor
            .extract_item(&html, url.as_str())
            .map_err(|_| FetchFailure::StructureNotFound {
                url: url.to_string(),
            })?;
        tracing::info!(
            url = %url,
            name = record.name().unwrap_or_default(),
            mods = record.mods().len(),
            "poedb.fetch.item_ok"
        );
        Ok(record)
    }

    /// Like [`PageSource::fetch_current_league`], but keeps the failure cause.
    ///
    /// `Ok(None)` means the landing page loaded but no card was marked active.
    pub async fn fetch_current_league_detailed(&self) -> Result<Option<LeagueInfo>, FetchFailure> {
        let url = self.http.base().clone();
        let html = self.get_page(&url).await?;
        let league = self.extractor.extract_current_league(&html);
        match &league {
            Some(info) => tracing::info!(
                name = info.name.as_deref().unwrap_or_default(),
                version = info.version.as_deref().unwrap_or_default(),
                "poedb.league.found"
            ),
            None => tracing::info!(url = %url, "poedb.league.not_found"),
        }
        Ok(league)
    }
}

#[async_trait]
impl PageSource for PoedbFetcher {
    async fn fetch_item(&self, identifier_or_url: &str) -> Option<ItemRecord> {
        self.fetch_item_detailed(identifier_or_url)
            .await
            .map_err(|failure| failure.log())
            .ok()
    }

    async fn fetch_current_league(&self) -> Option<LeagueInfo> {
        self.fetch_current_league_detailed()
            .await
            .map_err(|failure| failure.log())
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> PoedbFetcher {
        PoedbFetcher::new(&PoedbSettings::default()).unwrap()
    }

    #[test]
    fn identifiers_are_joined_onto_the_base() {
        let url = fetcher().target_url("Kaoms_Heart").unwrap();
        assert_eq!(url.as_str(), "https://poedb.tw/kr/Kaoms_Heart");
    }

    #[test]
    fn full_urls_pass_through() {
        let url = fetcher()
            .target_url("https://poedb.tw/us/Mageblood")
            .unwrap();
        assert_eq!(url.as_str(), "https://poedb.tw/us/Mageblood");
    }

    #[test]
    fn unparseable_url_is_an_invalid_target() {
        let err = fetcher().target_url("http://[::1").unwrap_err();
        assert!(matches!(
            err,
            FetchFailure::InvalidTarget { ref target, .. } if target == "http://[::1"
        ));
    }

    #[test]
    fn settings_defaults() {
        let s = PoedbSettings::default();
        assert_eq!(s.timeout, Duration::from_secs(10));
        assert_eq!(s.politeness_delay, Duration::from_millis(1500));
        assert_eq!(s.base_url, "https://poedb.tw/kr/");
    }
}
