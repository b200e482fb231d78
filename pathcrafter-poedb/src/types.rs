use serde::{Deserialize, Serialize};

/// Host the item-page URLs must point at to be fetched directly.
pub const REFERENCE_HOST: &str = "poedb.tw";

/// Single modifier line stored when no page detail could be looked up.
pub const NO_DETAIL_MOD: &str = "(상세 옵션 정보 없음)";

/// Why an [`ItemRecord`] carries no scraped detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    #[default]
    None,
    /// The name could not be mapped to a page identifier.
    #[serde(alias = "mapper_failed")]
    ResolverFailed,
    /// The user asked for general advice without naming an item.
    NoItemSpecified,
}

/// Structured record for one item lookup.
///
/// Built once per request through one of the constructors and never
/// mutated afterwards. A `ResolverFailed` record always holds exactly one
/// [`NO_DETAIL_MOD`] line and no source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    name: Option<String>,
    #[serde(rename = "type", default)]
    item_type: Option<String>,
    #[serde(default)]
    mods: Vec<String>,
    #[serde(rename = "url", alias = "source_url", default)]
    source_url: Option<String>,
    #[serde(default)]
    notice: Notice,
}

impl ItemRecord {
    /// Record extracted from a fetched item page.
    pub fn scraped(
        name: String,
        item_type: Option<String>,
        mods: Vec<String>,
        source_url: String,
    ) -> Self {
        Self {
            name: Some(name),
            item_type,
            mods,
            source_url: Some(source_url),
            notice: Notice::None,
        }
    }

    /// Stand-in record for a name the resolver could not map.
    pub fn resolver_failed(query: &str) -> Self {
        Self {
            name: Some(query.trim().to_string()),
            item_type: None,
            mods: vec![NO_DETAIL_MOD.to_string()],
            source_url: None,
            notice: Notice::ResolverFailed,
        }
    }

    /// Placeholder used when the guide is requested without an item.
    pub fn no_item_specified() -> Self {
        Self {
            name: None,
            item_type: None,
            mods: Vec::new(),
            source_url: None,
            notice: Notice::NoItemSpecified,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn item_type(&self) -> Option<&str> {
        self.item_type.as_deref()
    }

    pub fn mods(&self) -> &[String] {
        &self.mods
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn notice(&self) -> Notice {
        self.notice
    }

    /// True when the modifier lines came from a real page.
    pub fn has_detail(&self) -> bool {
        self.notice == Notice::None && !self.mods.is_empty()
    }
}

/// The currently running challenge league, as advertised on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl LeagueInfo {
    /// "Settlers (3.25)" style label, or just the name when no version is known.
    pub fn label(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        Some(match self.version.as_deref() {
            Some(v) => format!("{name} ({v})"),
            None => name.to_string(),
        })
    }
}

/// What the user typed into the item box, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemQuery {
    /// A full item-page URL on the reference site, fetched as-is.
    Url(String),
    /// Free text that still has to go through the resolver.
    Name(String),
}

impl ItemQuery {
    /// Classify raw input. Blank input means no item was specified.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with("http") && trimmed.contains(REFERENCE_HOST) {
            Some(ItemQuery::Url(trimmed.to_string()))
        } else {
            Some(ItemQuery::Name(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemQuery::Url(s) | ItemQuery::Name(s) => s,
        }
    }
}
