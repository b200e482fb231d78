//! Declarative extraction rules for poedb.tw pages.
//!
//! Every selector the crate depends on lives in the constants below, so a
//! markup change on the site means editing this table and the fixtures
//! under `tests/fixtures/`, nothing else.
//!
//! A [`FieldRule`] applies when its `anchor` matches somewhere in the
//! document. Within a chain the first applicable rule decides the field,
//! even when its `target` then yields nothing; later rules are only tried
//! when earlier anchors are missing entirely.

use crate::types::{ItemRecord, LeagueInfo};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: &'static str, reason: String },
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: &'static str, reason: String },
    #[error("no item name found in page")]
    StructureNotFound,
}

/// How the text of a matched element becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Trimmed,
    /// Keep the part before the first occurrence of the delimiter.
    BeforeDelimiter(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub anchor: &'static str,
    /// Looked up inside the first anchor match. `None` reads the anchor itself.
    pub target: Option<&'static str>,
    pub mode: TextMode,
}

pub const NAME_RULES: &[FieldRule] = &[
    FieldRule {
        anchor: "div.itemHeader.doubleLine",
        // The type line shares the `itemName` class, so exclude it explicitly.
        target: Some("div.itemName:not(.typeLine) span.lc"),
        mode: TextMode::Trimmed,
    },
    FieldRule {
        anchor: "title",
        target: None,
        mode: TextMode::BeforeDelimiter("::"),
    },
];

pub const TYPE_RULES: &[FieldRule] = &[FieldRule {
    anchor: "div.itemHeader.doubleLine",
    target: Some("div.itemName.typeLine span.lc"),
    mode: TextMode::Trimmed,
}];

#[derive(Debug, Clone, Copy)]
pub struct ModRule {
    pub container: &'static str,
    pub line: &'static str,
    pub preferred: &'static str,
    pub footnote: &'static str,
}

pub const MOD_RULE: ModRule = ModRule {
    container: "div.Stats",
    line: "div.explicitMod",
    preferred: "span.secondary",
    footnote: r"\[\d+\]",
};

#[derive(Debug, Clone, Copy)]
pub struct LeagueRule {
    pub card: &'static str,
    pub link: &'static str,
    pub marker_text: &'static str,
    pub marker_href: &'static str,
    pub header: &'static str,
    pub version: &'static str,
}

pub const LEAGUE_RULE: LeagueRule = LeagueRule {
    card: "div.card.mb-2",
    link: "a[href]",
    marker_text: "running for",
    marker_href: "pathofexile.com/api/leagues/",
    header: "h5.card-header",
    version: "small.float-end",
};

fn compile(selector: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector,
        reason: e.to_string(),
    })
}

#[derive(Debug)]
struct CompiledRule {
    anchor: Selector,
    target: Option<Selector>,
    mode: TextMode,
}

impl CompiledRule {
    fn new(rule: &FieldRule) -> Result<Self, ExtractError> {
        Ok(Self {
            anchor: compile(rule.anchor)?,
            target: rule.target.map(compile).transpose()?,
            mode: rule.mode,
        })
    }
}

fn compile_chain(rules: &[FieldRule]) -> Result<Vec<CompiledRule>, ExtractError> {
    rules.iter().map(CompiledRule::new).collect()
}

/// Compiled form of the constants above. Build once, reuse per page.
#[derive(Debug)]
pub struct Extractor {
    name: Vec<CompiledRule>,
    item_type: Vec<CompiledRule>,
    mod_container: Selector,
    mod_line: Selector,
    mod_preferred: Selector,
    footnote: Regex,
    league_card: Selector,
    league_link: Selector,
    league_header: Selector,
    league_version: Selector,
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractError> {
        let footnote = Regex::new(MOD_RULE.footnote).map_err(|e| ExtractError::InvalidPattern {
            pattern: MOD_RULE.footnote,
            reason: e.to_string(),
        })?;
        Ok(Self {
            name: compile_chain(NAME_RULES)?,
            item_type: compile_chain(TYPE_RULES)?,
            mod_container: compile(MOD_RULE.container)?,
            mod_line: compile(MOD_RULE.line)?,
            mod_preferred: compile(MOD_RULE.preferred)?,
            footnote,
            league_card: compile(LEAGUE_RULE.card)?,
            league_link: compile(LEAGUE_RULE.link)?,
            league_header: compile(LEAGUE_RULE.header)?,
            league_version: compile(LEAGUE_RULE.version)?,
        })
    }

    /// Parse an item page. `source_url` is recorded verbatim in the result.
    pub fn extract_item(&self, html: &str, source_url: &str) -> Result<ItemRecord, ExtractError> {
        let doc = Html::parse_document(html);
        let name = apply_chain(&doc, &self.name).ok_or(ExtractError::StructureNotFound)?;
        let item_type = apply_chain(&doc, &self.item_type);
        let mods = self.collect_mods(&doc);
        Ok(ItemRecord::scraped(name, item_type, mods, source_url.to_string()))
    }

    fn collect_mods(&self, doc: &Html) -> Vec<String> {
        let Some(stats) = doc.select(&self.mod_container).next() else {
            return Vec::new();
        };
        stats
            .select(&self.mod_line)
            .filter_map(|line| {
                let raw = match line.select(&self.mod_preferred).next() {
                    Some(span) => element_text(span),
                    None => element_text(line),
                };
                let cleaned = self.footnote.replace_all(&raw, "");
                let cleaned = cleaned.trim();
                (!cleaned.is_empty()).then(|| cleaned.to_string())
            })
            .collect()
    }

    /// Find the running challenge league on the landing page.
    ///
    /// Only the first card carrying the active marker is considered.
    pub fn extract_current_league(&self, html: &str) -> Option<LeagueInfo> {
        let doc = Html::parse_document(html);
        let card = doc
            .select(&self.league_card)
            .find(|card| self.is_active_card(*card))?;
        let header = card.select(&self.league_header).next()?;

        let name = leading_text(header).filter(|n| !n.is_empty())?;
        let version = header
            .select(&self.league_version)
            .next()
            .map(|v| element_text(v).trim().to_string())
            .filter(|v| !v.is_empty());
        Some(LeagueInfo {
            name: Some(name),
            version,
        })
    }

    fn is_active_card(&self, card: ElementRef<'_>) -> bool {
        card.select(&self.league_link).any(|link| {
            let href = link.value().attr("href").unwrap_or_default();
            let text = collapse_whitespace(&element_text(link)).to_lowercase();
            text.contains(LEAGUE_RULE.marker_text) && href.contains(LEAGUE_RULE.marker_href)
        })
    }
}

fn apply_chain(doc: &Html, chain: &[CompiledRule]) -> Option<String> {
    for rule in chain {
        let Some(anchor) = doc.select(&rule.anchor).next() else {
            continue;
        };
        let node = match &rule.target {
            Some(target) => anchor.select(target).next(),
            None => Some(anchor),
        };
        return node
            .map(|n| apply_mode(&element_text(n), rule.mode))
            .filter(|v| !v.is_empty());
    }
    None
}

fn apply_mode(text: &str, mode: TextMode) -> String {
    let text = text.trim();
    match mode {
        TextMode::Trimmed => text.to_string(),
        TextMode::BeforeDelimiter(delim) => text
            .split_once(delim)
            .map_or(text, |(head, _)| head)
            .trim()
            .to_string(),
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first non-blank child node: a bare text node, or the full
/// text of a child element.
fn leading_text(el: ElementRef<'_>) -> Option<String> {
    el.children().find_map(|child| match child.value() {
        Node::Text(t) if t.trim().is_empty() => None,
        Node::Text(t) => Some(t.trim().to_string()),
        Node::Element(_) => ElementRef::wrap(child).map(|e| element_text(e).trim().to_string()),
        _ => None,
    })
}
