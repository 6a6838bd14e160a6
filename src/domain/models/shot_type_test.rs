use strum::IntoEnumIterator;
use strum::VariantNames;

use super::ShotType;

#[test]
fn it_parses_wire_tags() {
    assert_eq!(ShotType::parse("flat_lay"), Some(ShotType::FlatLay));
    assert_eq!(
        ShotType::parse("instagram_story"),
        Some(ShotType::InstagramStory)
    );
    assert_eq!(ShotType::parse("FlatLay"), None);
    assert_eq!(ShotType::parse(""), None);
}

#[test]
fn it_round_trips_every_variant_through_its_tag() {
    for shot_type in ShotType::iter() {
        assert_eq!(ShotType::parse(&shot_type.to_string()), Some(shot_type));
        let json = serde_json::to_string(&shot_type).unwrap();
        assert_eq!(json, format!("\"{shot_type}\""));
    }
}

#[test]
fn it_lists_variant_names_as_wire_tags() {
    assert_eq!(ShotType::VARIANTS.len(), 10);
    assert!(ShotType::VARIANTS.contains(&"white_background"));
    assert!(ShotType::VARIANTS.contains(&"instagram_post"));
}

#[test]
fn it_has_human_labels() {
    assert_eq!(ShotType::WhiteBackground.label(), "White Background");
    assert_eq!(ShotType::Hero.label(), "Hero");
}
