//! Markdown rendering of a finished or reloaded guide.

use crate::classes::Language;
use crate::job::{GuideRequest, GuideResult};
use crate::snapshot::Snapshot;
use pathcrafter_poedb::{ItemRecord, Notice};
use std::fmt::Write as _;

const SUMMARY_MODS: usize = 3;

/// Where the guide text came from; only changes the guide heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Generated,
    Snapshot,
}

/// Everything [`render_markdown`] needs, borrowed from a result or snapshot.
pub struct GuideView<'a> {
    pub request: GuideRequest,
    pub item: &'a ItemRecord,
    pub guide: &'a str,
    /// Page identifier that came from a guess rather than the table.
    pub guessed_identifier: Option<&'a str>,
    pub origin: Origin,
}

impl<'a> GuideView<'a> {
    pub fn from_result(result: &'a GuideResult) -> Self {
        Self {
            request: result.request.clone(),
            item: &result.item,
            guide: &result.guide,
            guessed_identifier: result
                .resolution
                .as_ref()
                .filter(|r| !r.is_verified())
                .map(|r| r.identifier.as_str()),
            origin: Origin::Generated,
        }
    }

    pub fn from_snapshot(snapshot: &'a Snapshot) -> Self {
        Self {
            request: snapshot.to_request(),
            item: &snapshot.crawled_item_data,
            guide: &snapshot.generated_guide_text_markdown,
            guessed_identifier: None,
            origin: Origin::Snapshot,
        }
    }
}

pub fn render_markdown(view: &GuideView<'_>) -> String {
    let req = &view.request;
    let item = view.item;
    let korean = req.language == Language::Korean;
    let target = if korean {
        format!("(대상: {}, 리그: {})", req.class_label(), req.league_label())
    } else {
        format!("(target: {}, league: {})", req.class_label(), req.league_label())
    };
    let no_item = item.notice() == Notice::NoItemSpecified;
    let name = item
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| req.item_query.trim().to_string());
    let url = item.source_url().filter(|u| !u.is_empty() && *u != "#");

    let mut out = String::new();
    let _ = match (no_item, url, korean) {
        (true, _, true) => writeln!(out, "### 일반 빌드 가이드 {target}"),
        (true, _, false) => writeln!(out, "### General build guide {target}"),
        (false, Some(url), true) => writeln!(out, "### 조회된 아이템: [{name}]({url}) {target}"),
        (false, Some(url), false) => writeln!(out, "### Item: [{name}]({url}) {target}"),
        (false, None, true) => writeln!(out, "### [{name}] 아이템 정보 {target}"),
        (false, None, false) => writeln!(out, "### [{name}] item info {target}"),
    };

    if !no_item {
        let kind = item
            .item_type()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(if korean { "(알 수 없음)" } else { "(unknown)" });
        let _ = writeln!(out, "**{}:** {kind}", if korean { "유형" } else { "Type" });
    }

    let mods = item.mods();
    if item.has_detail() {
        let _ = writeln!(out, "**{}:**", if korean { "주요 옵션" } else { "Key modifiers" });
        for m in mods.iter().take(SUMMARY_MODS) {
            let _ = writeln!(out, "- {m}");
        }
        if mods.len() > SUMMARY_MODS {
            out.push_str(if korean { "- ... (등등)\n" } else { "- ... (and more)\n" });
        }
    } else if item.notice() == Notice::ResolverFailed {
        out.push_str(if korean {
            "**알림:** 아이템 상세 정보를 찾지 못해, 이름 기반으로 추론합니다.\n"
        } else {
            "**Notice:** no item details were found; the guide is inferred from the name.\n"
        });
    } else if no_item {
        out.push_str(if korean {
            "**알림:** 특정 아이템 없이 일반적인 빌드 가이드를 요청한 결과입니다.\n"
        } else {
            "**Notice:** this is a general build guide requested without a specific item.\n"
        });
    }

    if let Some(id) = view.guessed_identifier {
        let _ = if korean {
            writeln!(out, "**알림:** 페이지 식별자 '{id}'는 추정값이며 검증되지 않았습니다.")
        } else {
            writeln!(out, "**Notice:** the page identifier '{id}' was guessed and is unverified.")
        };
    }

    let status = match (view.origin, korean) {
        (Origin::Generated, true) => "생성 가이드 (완료!)",
        (Origin::Snapshot, true) => "생성 가이드 (스냅샷에서 불러옴)",
        (Origin::Generated, false) => "guide (done)",
        (Origin::Snapshot, false) => "guide (loaded from snapshot)",
    };
    let _ = write!(out, "\n---\n### {} {status}\n---\n", req.provider);
    out.push_str(view.guide);
    out
}
