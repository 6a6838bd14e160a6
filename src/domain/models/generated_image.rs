#[cfg(test)]
#[path = "generated_image_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::decode;
use super::deserialize_json_map;
use super::deserialize_lenient_shot_type;
use super::ApiError;
use super::ApiResult;
use super::JsonMap;
use super::ShotType;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: i64,
    pub user_id: Option<i64>,
    pub preset_id: Option<i64>,
    pub original_image_path: Option<String>,
    pub user_intent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_json_map")]
    pub structured_prompt: JsonMap,
    #[serde(default)]
    pub generated_image_url: String,
    #[serde(default, deserialize_with = "deserialize_lenient_shot_type")]
    pub shot_type: Option<ShotType>,
    pub angle: Option<String>,
    pub style: Option<String>,
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_json_map")]
    pub metadata: JsonMap,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,

    /// Mirrors `generated_image_url`.
    #[serde(default)]
    pub url: String,
    /// Mirrors `user_intent`.
    #[serde(default)]
    pub prompt: String,
}

impl GeneratedImage {
    /// Decodes an already unwrapped record and derives the alias fields.
    pub fn from_value(value: Value) -> ApiResult<GeneratedImage> {
        if value.is_null() {
            return Err(ApiError::new("Image not found"));
        }

        let image: GeneratedImage = decode(value)?;
        if image.generated_image_url.is_empty() {
            return Err(ApiError::new(
                "Generation response did not include an image URL",
            ));
        }

        return Ok(image.with_aliases());
    }

    pub fn with_aliases(mut self) -> GeneratedImage {
        self.url = self.generated_image_url.clone();
        self.prompt = self.user_intent.clone().unwrap_or_default();
        return self;
    }
}
