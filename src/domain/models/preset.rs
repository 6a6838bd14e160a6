#[cfg(test)]
#[path = "preset_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::decode;
use super::deserialize_json_map;
use super::deserialize_lenient_shot_type;
use super::ApiError;
use super::ApiResult;
use super::GeneratedImage;
use super::JsonMap;
use super::ShotType;

/// Display form of a structured prompt. Keys serialize in sorted order, so the
/// same mapping always produces the same text.
pub fn prompt_text(structured_prompt: &JsonMap) -> String {
    if structured_prompt.is_empty() {
        return "".to_string();
    }

    return Value::Object(structured_prompt.clone()).to_string();
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    /// `None` when the backend sent a tag this client does not know.
    #[serde(default, deserialize_with = "deserialize_lenient_shot_type")]
    pub shot_type: Option<ShotType>,
    #[serde(default, deserialize_with = "deserialize_json_map")]
    pub structured_prompt: JsonMap,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,

    /// The backend's prompt text, or `structured_prompt` rendered as JSON when
    /// none was sent.
    #[serde(default)]
    pub prompt: String,
}

impl Preset {
    /// Decodes an already unwrapped record and derives the display prompt.
    pub fn from_value(value: Value) -> ApiResult<Preset> {
        if value.is_null() {
            return Err(ApiError::new("Preset not found"));
        }

        let preset: Preset = decode(value)?;
        return Ok(preset.with_prompt());
    }

    pub fn with_prompt(mut self) -> Preset {
        if self.prompt.trim().is_empty() {
            self.prompt = prompt_text(&self.structured_prompt);
        }
        return self;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatePresetRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub shot_type: ShotType,
    pub structured_prompt: JsonMap,
}

impl CreatePresetRequest {
    /// Captures the styling of a generated image so it can be reapplied to
    /// other products.
    pub fn from_image(
        image: &GeneratedImage,
        name: &str,
        description: Option<String>,
    ) -> ApiResult<CreatePresetRequest> {
        if image.structured_prompt.is_empty() {
            return Err(ApiError::new(
                "This image has no structured prompt to save as a preset",
            ));
        }

        let shot_type = image.shot_type.ok_or_else(|| {
            return ApiError::new("This image has no shot type to save as a preset");
        })?;

        return Ok(CreatePresetRequest {
            name: name.to_string(),
            description,
            shot_type,
            structured_prompt: image.structured_prompt.clone(),
        });
    }
}

/// The shot type is fixed once a preset exists, so there is no field for it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePresetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_prompt: Option<JsonMap>,
}

impl UpdatePresetRequest {
    pub fn is_empty(&self) -> bool {
        return self.name.is_none() && self.description.is_none() && self.structured_prompt.is_none();
    }
}

/// Acknowledgement for a batch submission. Results are produced
/// asynchronously by the backend and are not part of this response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSubmission {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "total")]
    pub count: u64,
    #[serde(default)]
    pub status: String,
}
