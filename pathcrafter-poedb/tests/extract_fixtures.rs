mod common;

use common::fixture;
use pathcrafter_poedb::{ExtractError, Extractor, Notice};

#[test]
fn unique_item_page_yields_name_type_and_mods() {
    let extractor = Extractor::new().unwrap();
    let rec = extractor
        .extract_item(&fixture("item_kaoms_heart.html"), "https://poedb.tw/kr/Kaoms_Heart")
        .unwrap();

    assert_eq!(rec.name(), Some("카옴의 심장"));
    assert_eq!(rec.item_type(), Some("영광의 판금 갑옷"));
    assert_eq!(rec.mods(), ["홈 없음", "최대 생명력 +500", "화염 피해 20% 증가"]);
    assert_eq!(rec.source_url(), Some("https://poedb.tw/kr/Kaoms_Heart"));
    assert_eq!(rec.notice(), Notice::None);
}

#[test]
fn type_line_is_never_taken_as_the_name() {
    let extractor = Extractor::new().unwrap();
    let rec = extractor
        .extract_item(&fixture("item_type_line_first.html"), "u")
        .unwrap();

    assert_eq!(rec.name(), Some("Mageblood"));
    assert_eq!(rec.item_type(), Some("Heavy Belt"));
    assert_eq!(
        rec.mods(),
        ["+35 to Dexterity", "Magic Utility Flasks cannot be Used"]
    );
}

#[test]
fn page_without_header_uses_title() {
    let extractor = Extractor::new().unwrap();
    let rec = extractor
        .extract_item(&fixture("item_title_only.html"), "u")
        .unwrap();

    assert_eq!(rec.name(), Some("The Pariah"));
    assert_eq!(rec.item_type(), None);
    assert_eq!(rec.mods(), ["+1 to Level of Socketed Gems"]);
}

#[test]
fn page_without_any_name_is_structure_not_found() {
    let extractor = Extractor::new().unwrap();
    let err = extractor
        .extract_item(&fixture("item_unrecognized.html"), "u")
        .unwrap_err();
    assert!(matches!(err, ExtractError::StructureNotFound));
}

#[test]
fn first_running_card_wins_among_several() {
    let extractor = Extractor::new().unwrap();
    let info = extractor
        .extract_current_league(&fixture("league_landing.html"))
        .unwrap();
    assert_eq!(info.name.as_deref(), Some("Settlers"));
    assert_eq!(info.version.as_deref(), Some("3.25"));
}

#[test]
fn landing_page_without_active_card_has_no_league() {
    let extractor = Extractor::new().unwrap();
    assert_eq!(
        extractor.extract_current_league(&fixture("league_inactive.html")),
        None
    );
}
