#[cfg(test)]
#[path = "shot_type_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

/// Composition style of a product photo. Used both as a generation parameter
/// and as the classification tag of a preset.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumVariantNames,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShotType {
    Lifestyle,
    Hero,
    FlatLay,
    Context,
    WhiteBackground,
    Portrait,
    Landscape,
    InstagramPost,
    Square,
    InstagramStory,
}

impl ShotType {
    pub fn parse(text: &str) -> Option<ShotType> {
        return ShotType::iter().find(|e| return e.to_string() == text);
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShotType::Lifestyle => return "Lifestyle",
            ShotType::Hero => return "Hero",
            ShotType::FlatLay => return "Flat Lay",
            ShotType::Context => return "Context",
            ShotType::WhiteBackground => return "White Background",
            ShotType::Portrait => return "Portrait",
            ShotType::Landscape => return "Landscape",
            ShotType::InstagramPost => return "Instagram Post",
            ShotType::Square => return "Square",
            ShotType::InstagramStory => return "Instagram Story",
        }
    }
}

/// Unknown tags are tolerated on records so a new backend shot type never
/// breaks listing.
pub fn deserialize_lenient_shot_type<'de, D>(deserializer: D) -> Result<Option<ShotType>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    return Ok(tag.and_then(|text| return ShotType::parse(&text)));
}
