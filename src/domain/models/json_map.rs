use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

/// Open key/value mapping the backend is free to grow, such as a structured
/// prompt or generation metadata.
pub type JsonMap = serde_json::Map<String, Value>;

/// Accepts an object, a JSON-encoded object string, or null (read as empty).
pub fn deserialize_json_map<'de, D>(deserializer: D) -> Result<JsonMap, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => return Ok(JsonMap::new()),
        Value::Object(map) => return Ok(map),
        Value::String(text) => {
            if text.trim().is_empty() {
                return Ok(JsonMap::new());
            }
            return serde_json::from_str::<JsonMap>(&text).map_err(serde::de::Error::custom);
        }
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected an object, found {other}"
            )));
        }
    }
}
