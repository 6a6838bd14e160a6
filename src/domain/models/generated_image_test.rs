use anyhow::Result;
use serde_json::json;

use super::GeneratedImage;
use crate::domain::models::ShotType;

#[test]
fn it_derives_alias_fields() -> Result<()> {
    let image = GeneratedImage::from_value(json!({
        "id": 42,
        "generated_image_url": "a.png",
        "user_intent": "x",
    }))?;

    assert_eq!(image.generated_image_url, "a.png");
    assert_eq!(image.url, "a.png");
    assert_eq!(image.user_intent, Some("x".to_string()));
    assert_eq!(image.prompt, "x");
    return Ok(());
}

#[test]
fn it_ignores_alias_fields_sent_by_the_backend() -> Result<()> {
    let image = GeneratedImage::from_value(json!({
        "id": 1,
        "generated_image_url": "real.png",
        "url": "stale.png",
        "prompt": "stale",
    }))?;

    assert_eq!(image.url, "real.png");
    assert_eq!(image.prompt, "");
    return Ok(());
}

#[test]
fn it_decodes_full_records() -> Result<()> {
    let image = GeneratedImage::from_value(test_utils::generation_fixture(7))?;

    assert_eq!(image.id, 7);
    assert_eq!(image.user_id, Some(1));
    assert_eq!(image.preset_id, Some(3));
    assert_eq!(image.shot_type, Some(ShotType::Lifestyle));
    assert_eq!(image.structured_prompt["style"], json!("minimalist"));
    assert_eq!(image.metadata["seed"], json!(1234));
    return Ok(());
}

#[test]
fn it_accepts_string_encoded_and_null_mappings() -> Result<()> {
    let image = GeneratedImage::from_value(json!({
        "id": 5,
        "generated_image_url": "c.png",
        "structured_prompt": "{\"angle\":\"top-down\"}",
        "metadata": null,
    }))?;

    assert_eq!(image.structured_prompt["angle"], json!("top-down"));
    assert!(image.metadata.is_empty());
    return Ok(());
}

#[test]
fn it_tolerates_unknown_shot_types() -> Result<()> {
    let image = GeneratedImage::from_value(json!({
        "id": 5,
        "generated_image_url": "c.png",
        "shot_type": "macro",
    }))?;

    assert_eq!(image.shot_type, None);
    return Ok(());
}

#[test]
fn it_requires_an_image_url() {
    let err = GeneratedImage::from_value(json!({"id": 5})).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Generation response did not include an image URL");

    let err = GeneratedImage::from_value(json!(null)).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Image not found");
}
