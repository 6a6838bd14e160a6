#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;
use super::ApiResult;

/// Strips a `{message?, data}` wrapper. Bare payloads pass through untouched.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            return map.remove("data").unwrap_or(Value::Null);
        }
        other => return other,
    }
}

/// Normalizes a list response. Enveloped, bare, paginated and empty bodies all
/// produce a plain sequence of records.
pub fn unwrap_list(body: Value) -> ApiResult<Vec<Value>> {
    let mut value = unwrap_envelope(body);

    // Paginated responses nest the records one level deeper.
    let paginated = matches!(
        &value,
        Value::Object(map) if map.get("data").map_or(false, Value::is_array)
    );
    if paginated {
        value = unwrap_envelope(value);
    }

    match value {
        Value::Array(items) => return Ok(items),
        Value::Null => return Ok(vec![]),
        Value::Object(map) if map.is_empty() => return Ok(vec![]),
        _ => {
            return Err(ApiError::new(
                "Unexpected response from server: expected a list",
            ))
        }
    }
}

/// Generation endpoints answer with either a bare record or
/// `{message, data, image_url}`. The envelope's `image_url` backfills the
/// record when the record itself carries no URL.
pub fn unwrap_generation(body: Value) -> Value {
    let image_url = body
        .get("image_url")
        .and_then(Value::as_str)
        .map(|url| return url.to_string());

    let mut record = unwrap_envelope(body);
    if let (Some(url), Value::Object(map)) = (image_url, &mut record) {
        let missing = map
            .get("generated_image_url")
            .and_then(Value::as_str)
            .map_or(true, str::is_empty);
        if missing {
            map.insert("generated_image_url".to_string(), Value::String(url));
        }
    }

    return record;
}

pub fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    return serde_json::from_value(value).map_err(|err| {
        tracing::error!(error = ?err, "Failed to decode response body");
        return ApiError::new(format!("Unexpected response from server: {err}"));
    });
}
