//! Guide prompt templates.
//!
//! Two fixed templates, Korean and English. Both follow the same layout:
//! persona line, subject line, the player's situation, optional user notes,
//! four questions and a formatting request.

use crate::classes::Language;
use crate::job::GuideRequest;
use pathcrafter_poedb::{ItemRecord, Notice};

struct Template {
    persona: &'static str,
    subject: fn(&str, &str, &str) -> String,
    no_item_subject: &'static str,
    unknown_type: &'static str,
    no_detail: &'static str,
    class_only: fn(&str) -> String,
    class_with_ascendancy: fn(&str, &str) -> String,
    no_class: &'static str,
    league: fn(&str, &str) -> String,
    situation: fn(&str, &str) -> String,
    notes_intro: &'static str,
    notes_open: &'static str,
    notes_close: &'static str,
    questions_lead_item: &'static str,
    questions_lead_general: &'static str,
    questions: [&'static str; 4],
    item_phrase: &'static str,
    general_phrase: &'static str,
    closing: &'static str,
}

const KOREAN: Template = Template {
    persona: "당신은 Path of Exile 게임의 숙련된 전문가입니다. 초보 유저가 질문합니다.",
    subject: |name, kind, mods| format!("아이템: '{name}' ({kind}), 옵션: {mods}"),
    no_item_subject: "(특정 아이템 없이 일반 빌드 조언 요청)",
    unknown_type: "(정보 부족)",
    no_detail: "(상세 옵션 정보 없음)",
    class_only: |class| format!("'{class}' 클래스"),
    class_with_ascendancy: |class, asc| format!("'{class}' 클래스의 '{asc}' 전직 빌드"),
    no_class: "특정 클래스/빌드를 염두에 두지 않고 있습니다.",
    league: |season, mode| {
        format!("현재 '{season}' 리그의 '{mode}' 환경에서 플레이하고 있습니다.")
    },
    situation: |league, class| format!("저는 초보자이고, {league}에서 {class}를 키우려고 합니다."),
    notes_intro: "또한, 이 사용자는 다음과 같은 추가적인 노트나 구체적인 요청사항을 남겼습니다. 이 내용도 반드시 함께 고려하여 답변해주세요:",
    notes_open: "--- 사용자 노트 시작 ---",
    notes_close: "--- 사용자 노트 끝 ---",
    questions_lead_item: "위 모든 정보(아이템, 사용자 상황, 사용자 노트)를 종합적으로 고려하여 다음 질문에 답변해주세요:",
    questions_lead_general: "위 모든 정보(사용자 상황, 사용자 노트)를 종합적으로 고려하여 다음 질문에 답변해주세요. (특정 아이템에 대한 질문이 아닙니다.):",
    questions: [
        "1. 이 아이템(또는 현재 제 상황)이 저 같은 초보자에게 그리고 제 클래스/전직 및 현재 리그 환경에 유용한가요?",
        "2. 만약 유용하다면, (아이템이 있다면 아이템을 포함하여) 제 클래스/전직 빌드 및 리그 환경에 어떻게 활용할 수 있을까요? 어떤 장점이 있나요?",
        "3. 현재 상황에서 특별히 주의해야 할 점이나 (특히 하드코어라면 생존 관련) 알아두면 좋은 팁이 있다면 알려주세요.",
        "4. 현재 제 상황(아이템, 클래스/전직, 리그)과 잘 어울리는, Path of Exile에 실제로 존재하는 다른 아이템(고유 아이템 이름이나 일반적인 아이템 유형)이나 주요 스킬 젬 이름을 2~3가지 추천해주고, 왜 그것들이 도움이 되는지 간략히 설명해주세요. 만약 구체적인 이름 추천이 어렵다면, 어떤 '종류'의 아이템이나 스킬이 도움이 될지 설명해주면 좋겠습니다.",
    ],
    item_phrase: "이 아이템",
    general_phrase: "제 상황",
    closing: "Markdown으로 친절하고 자세하게 답변해주세요.",
};

const ENGLISH: Template = Template {
    persona: "You are a seasoned Path of Exile expert. A new player is asking for help.",
    subject: |name, kind, mods| format!("Item: '{name}' ({kind}), modifiers: {mods}"),
    no_item_subject: "(General build advice requested, no specific item)",
    unknown_type: "(unknown type)",
    no_detail: "(no detailed modifiers available)",
    class_only: |class| format!("a {class}"),
    class_with_ascendancy: |class, asc| format!("a {class} build going {asc}"),
    no_class: "no particular class or build in mind",
    league: |season, mode| format!("the {season} league in {mode}"),
    situation: |league, class| {
        format!("I am a beginner playing {league}, and I want to level {class}.")
    },
    notes_intro: "The player also left the following notes or specific requests. Take them into account in your answer:",
    notes_open: "--- user notes start ---",
    notes_close: "--- user notes end ---",
    questions_lead_item: "Considering everything above (the item, my situation and my notes), please answer the following:",
    questions_lead_general: "Considering everything above (my situation and my notes), please answer the following. (This is not about a specific item.):",
    questions: [
        "1. Is this item (or my current situation) useful for a beginner like me, for my class/ascendancy and the current league?",
        "2. If so, how can I make use of it (including the item, if there is one) in my class/ascendancy build and league? What are the strengths?",
        "3. Is there anything I should be especially careful about right now, or tips worth knowing (survival tips in particular if this is hardcore)?",
        "4. Recommend 2-3 other items that actually exist in Path of Exile (unique names or common base types) or key skill gems that fit my situation (item, class/ascendancy, league), and briefly explain why they help. If naming specific ones is hard, describe what kind of item or skill would help.",
    ],
    item_phrase: "this item",
    general_phrase: "my situation",
    closing: "Please answer in Markdown, in a friendly and detailed way.",
};

fn template(lang: Language) -> &'static Template {
    match lang {
        Language::Korean => &KOREAN,
        Language::English => &ENGLISH,
    }
}

fn subject_line(t: &Template, item: &ItemRecord) -> String {
    let name = item.name().unwrap_or_default();
    let item_type = item
        .item_type()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(t.unknown_type);
    let mods = if item.has_detail() {
        item.mods().join("\n- ")
    } else {
        t.no_detail.to_string()
    };
    (t.subject)(name, item_type, &mods)
}

/// Assemble the prompt sent to the LLM for one request.
///
/// `item` decides the subject: a [`Notice::NoItemSpecified`] record switches
/// to the general-advice wording and rewrites the questions to talk about
/// the player's situation instead of an item.
pub fn build_prompt(request: &GuideRequest, item: &ItemRecord) -> String {
    let lang = request.language;
    let t = template(lang);
    let general = item.notice() == Notice::NoItemSpecified;

    let class_context = match (request.base_class, request.ascendancy) {
        (Some(class), Some(asc)) => (t.class_with_ascendancy)(class.label(lang), asc.label(lang)),
        (Some(class), None) => (t.class_only)(class.label(lang)),
        (None, _) => t.no_class.to_string(),
    };
    let league_context = (t.league)(&request.season(), request.league_mode.label(lang));

    let mut out = String::new();
    out.push_str(t.persona);
    out.push('\n');
    if general {
        out.push_str(t.no_item_subject);
    } else {
        out.push_str(&subject_line(t, item));
    }
    out.push('\n');
    out.push_str(&(t.situation)(&league_context, &class_context));
    out.push('\n');

    let notes = request.user_notes.trim();
    if !notes.is_empty() {
        out.push('\n');
        out.push_str(t.notes_intro);
        out.push('\n');
        out.push_str(t.notes_open);
        out.push('\n');
        out.push_str(notes);
        out.push('\n');
        out.push_str(t.notes_close);
        out.push('\n');
    }

    out.push('\n');
    out.push_str(if general {
        t.questions_lead_general
    } else {
        t.questions_lead_item
    });
    out.push('\n');
    for question in t.questions {
        if general {
            out.push_str(&question.replace(t.item_phrase, t.general_phrase));
        } else {
            out.push_str(question);
        }
        out.push('\n');
    }
    out.push('\n');
    out.push_str(t.closing);
    out
}
