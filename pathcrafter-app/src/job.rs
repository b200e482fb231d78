//! The guide job: resolve, fetch, prompt, generate.
//!
//! A job runs once per [`GuideRequest`]. Progress goes out over an mpsc
//! channel as [`Progress`] events; cancellation is a
//! [`CancellationToken`] checked before the fetch, before the LLM call and
//! after it.

use crate::classes::{Ascendancy, BaseClass, Language, LeagueMode, season_placeholder};
use crate::prompt::build_prompt;
use pathcrafter_common::{PathcrafterError, Provider};
use pathcrafter_llm::SharedLlmClient;
use pathcrafter_poedb::{IdentifierResolver, ItemQuery, ItemRecord, PageSource, Resolution};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything the user chose for one guide.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideRequest {
    /// Item name, poedb URL, or blank for general advice.
    pub item_query: String,
    pub base_class: Option<BaseClass>,
    pub ascendancy: Option<Ascendancy>,
    pub league_mode: LeagueMode,
    /// Season label such as "Settlers (3.25)"; blank means unknown.
    pub league_season: String,
    pub provider: Provider,
    pub user_notes: String,
    pub language: Language,
}

impl Default for GuideRequest {
    fn default() -> Self {
        Self {
            item_query: String::new(),
            base_class: None,
            ascendancy: None,
            league_mode: LeagueMode::default(),
            league_season: String::new(),
            provider: Provider::ChatGpt,
            user_notes: String::new(),
            language: Language::default(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("select a character class when no item is given")]
    ClassRequired,
    #[error("{ascendancy} is not an ascendancy of {class}")]
    AscendancyMismatch {
        class: BaseClass,
        ascendancy: Ascendancy,
    },
}

impl GuideRequest {
    /// Check the request and fill in the class implied by the ascendancy.
    pub fn validated(mut self) -> Result<Self, RequestError> {
        match (self.base_class, self.ascendancy) {
            (None, Some(asc)) => self.base_class = Some(asc.base_class()),
            (Some(class), Some(asc)) if asc.base_class() != class => {
                return Err(RequestError::AscendancyMismatch {
                    class,
                    ascendancy: asc,
                });
            }
            _ => {}
        }
        if self.query().is_none() && self.base_class.is_none() {
            return Err(RequestError::ClassRequired);
        }
        Ok(self)
    }

    pub fn query(&self) -> Option<ItemQuery> {
        ItemQuery::parse(&self.item_query)
    }

    /// Season label, or the placeholder when none was given.
    pub fn season(&self) -> String {
        let season = self.league_season.trim();
        if season.is_empty() {
            season_placeholder(self.language).to_string()
        } else {
            season.to_string()
        }
    }

    /// "Marauder (Juggernaut)" style label for headings and progress lines.
    pub fn class_label(&self) -> String {
        let lang = self.language;
        match (self.base_class, self.ascendancy) {
            (Some(class), Some(asc)) => format!("{} ({})", class.label(lang), asc.label(lang)),
            (Some(class), None) => class.label(lang).to_string(),
            (None, _) => match lang {
                Language::Korean => "클래스 미지정".to_string(),
                Language::English => "No class".to_string(),
            },
        }
    }

    pub fn league_label(&self) -> String {
        format!("{} {}", self.season(), self.league_mode.label(self.language))
    }
}

/// One progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub message: String,
}

/// A finished guide and everything needed to render or snapshot it.
#[derive(Debug, Clone)]
pub struct GuideResult {
    pub request: GuideRequest,
    pub item: ItemRecord,
    /// How the item name was mapped, when it went through the resolver.
    pub resolution: Option<Resolution>,
    pub guide: String,
    pub model: String,
}

#[derive(Debug)]
pub enum GuideOutcome {
    Completed(Box<GuideResult>),
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("could not fetch item information for '{query}'")]
    Crawl { query: String },
    #[error("guide generation failed: {0}")]
    Llm(#[from] PathcrafterError),
}

pub struct GuideJob {
    resolver: IdentifierResolver,
    pages: Arc<dyn PageSource>,
    llm: SharedLlmClient,
}

struct Reporter<'a> {
    tx: &'a mpsc::Sender<Progress>,
}

impl Reporter<'_> {
    async fn emit(&self, percent: u8, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(percent, message = %message, "guide.progress");
        // A dropped receiver only means nobody is watching.
        let _ = self.tx.send(Progress { percent, message }).await;
    }
}

async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

impl GuideJob {
    pub fn new(
        resolver: IdentifierResolver,
        pages: Arc<dyn PageSource>,
        llm: SharedLlmClient,
    ) -> Self {
        Self {
            resolver,
            pages,
            llm,
        }
    }

    /// Run the request to completion, cancellation or the first hard error.
    pub async fn run(
        &self,
        request: GuideRequest,
        progress: mpsc::Sender<Progress>,
        cancel: CancellationToken,
    ) -> Result<GuideOutcome, JobError> {
        let request = request.validated()?;
        let reporter = Reporter { tx: &progress };
        let korean = request.language == Language::Korean;
        let query = request.query();
        let shown_query = query
            .as_ref()
            .map(|q| q.as_str().to_string())
            .unwrap_or_else(|| if korean { "(아이템 없음)" } else { "(no item)" }.to_string());

        tracing::info!(
            query = %shown_query,
            class = %request.class_label(),
            league = %request.league_label(),
            provider = %request.provider,
            "guide.start"
        );
        reporter
            .emit(
                5,
                if korean {
                    format!(
                        "'{shown_query}' (대상: {}, 리그: {}) 처리 요청 접수...",
                        request.class_label(),
                        request.league_label()
                    )
                } else {
                    format!(
                        "Accepted '{shown_query}' (target: {}, league: {})",
                        request.class_label(),
                        request.league_label()
                    )
                },
            )
            .await;

        if cancel.is_cancelled() {
            return Ok(self.cancelled());
        }

        let mut resolution = None;
        let fetched = match &query {
            None => Some(ItemRecord::no_item_specified()),
            Some(ItemQuery::Url(url)) => {
                reporter
                    .emit(
                        15,
                        if korean {
                            format!("URL에서 '{url}' 정보 가져오는 중...")
                        } else {
                            format!("Fetching '{url}'")
                        },
                    )
                    .await;
                match until_cancelled(&cancel, self.pages.fetch_item(url)).await {
                    Some(item) => item,
                    None => return Ok(self.cancelled()),
                }
            }
            Some(ItemQuery::Name(name)) => {
                reporter
                    .emit(
                        10,
                        if korean {
                            format!("'{name}' 아이템 이름으로 URL 식별자 찾는 중...")
                        } else {
                            format!("Looking up the page identifier for '{name}'")
                        },
                    )
                    .await;
                match self.resolver.resolve(name) {
                    Some(found) => {
                        let id = found.identifier.clone();
                        let note = match (found.is_verified(), korean) {
                            (true, true) => format!("'{id}' 정보 poedb.tw에서 가져오는 중..."),
                            (false, true) => {
                                format!("'{id}' (추정 식별자) 정보 poedb.tw에서 가져오는 중...")
                            }
                            (true, false) => format!("Fetching '{id}' from poedb.tw"),
                            (false, false) => {
                                format!("Fetching '{id}' (guessed identifier) from poedb.tw")
                            }
                        };
                        reporter.emit(20, note).await;
                        resolution = Some(found);
                        match until_cancelled(&cancel, self.pages.fetch_item(&id)).await {
                            Some(item) => item,
                            None => return Ok(self.cancelled()),
                        }
                    }
                    None => {
                        reporter
                            .emit(
                                20,
                                if korean {
                                    format!("'{name}'에 대한 URL 식별자 찾기 실패.")
                                } else {
                                    format!("No page identifier found for '{name}'")
                                },
                            )
                            .await;
                        Some(ItemRecord::resolver_failed(name))
                    }
                }
            }
        };

        if cancel.is_cancelled() {
            return Ok(self.cancelled());
        }
        reporter
            .emit(
                50,
                if korean {
                    "정보 분석 완료, LLM 프롬프트 구성 중..."
                } else {
                    "Item information ready, building the prompt"
                },
            )
            .await;

        let item = match fetched {
            Some(item) if query.is_none() || item.name().is_some() => item,
            _ => {
                tracing::info!(query = %shown_query, "guide.crawl_failed");
                return Err(JobError::Crawl {
                    query: shown_query,
                });
            }
        };

        let prompt = build_prompt(&request, &item);
        let model = self.llm.model_name().to_string();
        reporter
            .emit(
                60,
                if korean {
                    format!("{} ({model})에게 가이드 요청 중...", request.provider)
                } else {
                    format!("Requesting a guide from {} ({model})", request.provider)
                },
            )
            .await;

        let guide = match until_cancelled(&cancel, self.llm.generate_guide(&prompt)).await {
            Some(result) => result?,
            None => return Ok(self.cancelled()),
        };
        if cancel.is_cancelled() {
            return Ok(self.cancelled());
        }

        reporter
            .emit(
                95,
                if korean {
                    format!("{} 응답 수신 완료, 결과 표시 준비 중...", request.provider)
                } else {
                    format!("{} answered, preparing the result", request.provider)
                },
            )
            .await;
        tracing::info!(model = %model, guide_chars = guide.chars().count(), "guide.done");

        Ok(GuideOutcome::Completed(Box::new(GuideResult {
            request,
            item,
            resolution,
            guide,
            model,
        })))
    }

    fn cancelled(&self) -> GuideOutcome {
        tracing::info!("guide.cancelled");
        GuideOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_request_needs_a_class() {
        let err = GuideRequest::default().validated().unwrap_err();
        assert_eq!(err, RequestError::ClassRequired);

        let ok = GuideRequest {
            base_class: Some(BaseClass::Witch),
            ..GuideRequest::default()
        };
        assert!(ok.validated().is_ok());
    }

    #[test]
    fn ascendancy_implies_and_must_match_class() {
        let req = GuideRequest {
            ascendancy: Some(Ascendancy::Occultist),
            ..GuideRequest::default()
        }
        .validated()
        .unwrap();
        assert_eq!(req.base_class, Some(BaseClass::Witch));

        let err = GuideRequest {
            item_query: "Headhunter".into(),
            base_class: Some(BaseClass::Ranger),
            ascendancy: Some(Ascendancy::Slayer),
            ..GuideRequest::default()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, RequestError::AscendancyMismatch { .. }));
    }

    #[test]
    fn labels_fall_back_to_placeholders() {
        let req = GuideRequest {
            league_mode: LeagueMode::Hardcore,
            ..GuideRequest::default()
        };
        assert_eq!(req.class_label(), "클래스 미지정");
        assert_eq!(req.league_label(), "시즌 하드코어");

        let req = GuideRequest {
            base_class: Some(BaseClass::Shadow),
            ascendancy: Some(Ascendancy::Trickster),
            league_season: " Settlers (3.25) ".into(),
            language: Language::English,
            ..GuideRequest::default()
        };
        assert_eq!(req.class_label(), "Shadow (Trickster)");
        assert_eq!(req.league_label(), "Settlers (3.25) Softcore");
    }
}
