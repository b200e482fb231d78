//! Build snapshots: a finished guide saved as pretty-printed JSON.
//!
//! The layout is versioned. Version 1.3 added `user_notes_text`; older
//! files (1.1, 1.2) still load and simply come back without notes.

use crate::classes::{Ascendancy, BaseClass, Language, LeagueMode, season_placeholder};
use crate::job::{GuideRequest, GuideResult};
use pathcrafter_common::Provider;
use pathcrafter_poedb::ItemRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: &str = "1.3";
pub const SUPPORTED_VERSIONS: [&str; 3] = ["1.1", "1.2", "1.3"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("snapshot {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("snapshot {0} does not hold a JSON object")]
    NotAnObject(PathBuf),
    #[error("snapshot version {found:?} is not supported (supported: {})", SUPPORTED_VERSIONS.join(", "))]
    UnsupportedVersion { found: Option<String> },
}

/// The user's inputs as they were when the guide was generated.
///
/// Class, ascendancy and mode are stored as display labels in the
/// request language, so a snapshot reads naturally on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryInputs {
    pub item_input_text: String,
    pub base_class: String,
    pub ascendancy_class: String,
    pub league_mode: String,
    pub league_season: String,
    pub selected_llm: String,
}

fn no_item() -> ItemRecord {
    ItemRecord::no_item_specified()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_version: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub query_inputs: QueryInputs,
    #[serde(default = "no_item")]
    pub crawled_item_data: ItemRecord,
    #[serde(default)]
    pub generated_guide_text_markdown: String,
    #[serde(default)]
    pub user_notes_text: String,
    /// `ko` or `en`; absent in files written before English output existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Snapshot {
    pub fn from_result(result: &GuideResult) -> Self {
        let req = &result.request;
        let lang = req.language;
        Self {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            query_inputs: QueryInputs {
                item_input_text: req.item_query.trim().to_string(),
                base_class: req
                    .base_class
                    .map(|c| c.label(lang).to_string())
                    .unwrap_or_default(),
                ascendancy_class: req
                    .ascendancy
                    .map(|a| a.label(lang).to_string())
                    .unwrap_or_default(),
                league_mode: req.league_mode.label(lang).to_string(),
                league_season: req.season(),
                selected_llm: req.provider.display_name().to_string(),
            },
            crawled_item_data: result.item.clone(),
            generated_guide_text_markdown: result.guide.clone(),
            user_notes_text: req.user_notes.clone(),
            language: Some(lang.code().to_string()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
            .as_deref()
            .and_then(|code| code.parse().ok())
            .unwrap_or_default()
    }

    /// Rebuild the request from the stored labels.
    ///
    /// Labels that no longer parse (placeholders such as "클래스 선택 안함",
    /// or a removed ascendancy) come back as unset rather than failing the load.
    pub fn to_request(&self) -> GuideRequest {
        let inputs = &self.query_inputs;
        GuideRequest {
            item_query: inputs.item_input_text.clone(),
            base_class: inputs.base_class.parse::<BaseClass>().ok(),
            ascendancy: inputs.ascendancy_class.parse::<Ascendancy>().ok(),
            league_mode: inputs.league_mode.parse::<LeagueMode>().unwrap_or_default(),
            league_season: inputs.league_season.clone(),
            provider: inputs
                .selected_llm
                .parse::<Provider>()
                .unwrap_or(Provider::ChatGpt),
            user_notes: self.user_notes_text.clone(),
            language: self.language(),
        }
    }

    /// `<item>_<class>[_<ascendancy>]_<season>_<mode>_snapshot.json`
    pub fn default_file_name(&self) -> String {
        let req = self.to_request();
        let lang = req.language;

        let mut item: String = req
            .item_query
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if item.is_empty() {
            item = match lang {
                Language::Korean => "일반가이드",
                Language::English => "general_guide",
            }
            .to_string();
        }

        let class = match req.base_class {
            Some(c) => c.label(lang),
            None => match lang {
                Language::Korean => "모든클래스",
                Language::English => "AllClasses",
            },
        };
        let ascendancy = req
            .ascendancy
            .map(|a| format!("_{}", a.label(lang)))
            .unwrap_or_default();

        let season = req.league_season.split(" (").next().unwrap_or_default().trim();
        let season = if season.is_empty() {
            season_placeholder(lang).to_string()
        } else {
            season.replace(' ', "_")
        };

        format!(
            "{item}_{class}{ascendancy}_{season}_{}_snapshot.json",
            req.league_mode.label(lang)
        )
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, buf).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "snapshot.saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let json_err = |source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        };
        let value: serde_json::Value = serde_json::from_str(&text).map_err(json_err)?;
        let Some(obj) = value.as_object() else {
            return Err(SnapshotError::NotAnObject(path.to_path_buf()));
        };
        let version = obj
            .get("snapshot_version")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        if !version
            .as_deref()
            .is_some_and(|v| SUPPORTED_VERSIONS.contains(&v))
        {
            tracing::warn!(path = %path.display(), version = ?version, "snapshot.unsupported_version");
            return Err(SnapshotError::UnsupportedVersion { found: version });
        }
        let snapshot: Snapshot = serde_json::from_value(value).map_err(json_err)?;
        tracing::info!(path = %path.display(), version = %snapshot.snapshot_version, "snapshot.loaded");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathcrafter_poedb::Notice;

    fn result(item_query: &str, item: ItemRecord) -> GuideResult {
        GuideResult {
            request: GuideRequest {
                item_query: item_query.into(),
                base_class: Some(BaseClass::Marauder),
                ascendancy: Some(Ascendancy::Juggernaut),
                league_mode: LeagueMode::Hardcore,
                league_season: "Settlers of Kalguur (3.25)".into(),
                provider: Provider::Gemini,
                user_notes: "불의 저항 부족".into(),
                language: Language::Korean,
            },
            item,
            resolution: None,
            guide: "## 가이드".into(),
            model: "models/gemini-1.5-flash-latest".into(),
        }
    }

    #[test]
    fn file_name_sanitises_item_and_season() {
        let snap = Snapshot::from_result(&result(
            "Kaom's Heart: 3.25/HC",
            ItemRecord::resolver_failed("Kaom's Heart: 3.25/HC"),
        ));
        assert_eq!(
            snap.default_file_name(),
            "Kaom_s_Heart__3_25_HC_머라우더_저거넛_Settlers_of_Kalguur_하드코어_snapshot.json"
        );
    }

    #[test]
    fn general_guide_file_name() {
        let mut res = result("", ItemRecord::no_item_specified());
        res.request.ascendancy = None;
        res.request.league_season.clear();
        res.request.league_mode = LeagueMode::Softcore;
        let snap = Snapshot::from_result(&res);
        assert_eq!(snap.default_file_name(), "일반가이드_머라우더_시즌_소프트코어_snapshot.json");
    }

    #[test]
    fn from_result_records_labels_and_notes() {
        let snap = Snapshot::from_result(&result("헤헌", ItemRecord::resolver_failed("헤헌")));
        assert_eq!(snap.snapshot_version, "1.3");
        assert_eq!(snap.query_inputs.base_class, "머라우더");
        assert_eq!(snap.query_inputs.ascendancy_class, "저거넛");
        assert_eq!(snap.query_inputs.league_mode, "하드코어");
        assert_eq!(snap.query_inputs.selected_llm, "Gemini");
        assert_eq!(snap.user_notes_text, "불의 저항 부족");
        assert_eq!(snap.crawled_item_data.notice(), Notice::ResolverFailed);
        assert_eq!(snap.to_request(), result("헤헌", ItemRecord::no_item_specified()).request);
    }

    #[test]
    fn placeholder_labels_parse_as_unset() {
        let snap = Snapshot {
            snapshot_version: "1.1".into(),
            timestamp: String::new(),
            query_inputs: QueryInputs {
                base_class: "클래스 선택 안함".into(),
                ascendancy_class: "전직 선택 안함".into(),
                league_mode: "소프트코어".into(),
                selected_llm: "ChatGPT".into(),
                ..QueryInputs::default()
            },
            crawled_item_data: ItemRecord::no_item_specified(),
            generated_guide_text_markdown: String::new(),
            user_notes_text: String::new(),
            language: None,
        };
        let req = snap.to_request();
        assert_eq!(req.base_class, None);
        assert_eq!(req.ascendancy, None);
        assert_eq!(req.provider, Provider::ChatGpt);
        assert_eq!(req.language, Language::Korean);
    }
}
