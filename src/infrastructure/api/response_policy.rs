#[cfg(test)]
#[path = "response_policy_test.rs"]
mod tests;

use std::fmt;

use serde::de::MapAccess;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

use crate::domain::models::ApiError;
use crate::domain::models::ApiResult;
use crate::domain::models::AuthRedirect;
use crate::domain::models::CredentialStore;

/// Field errors in the order the backend sent them.
struct FieldErrors(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D>(deserializer: D) -> Result<FieldErrors, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldErrorsVisitor;

        impl<'de> Visitor<'de> for FieldErrorsVisitor {
            type Value = FieldErrors;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                return formatter.write_str("a map of field names to messages");
            }

            fn visit_map<A>(self, mut access: A) -> Result<FieldErrors, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = vec![];
                while let Some(entry) = access.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                return Ok(FieldErrors(entries));
            }
        }

        return deserializer.deserialize_map(FieldErrorsVisitor);
    }
}

#[derive(Deserialize)]
struct ValidationBody {
    errors: Option<FieldErrors>,
}

pub fn status_message(status: u16) -> String {
    return format!("Request failed with status code {status}");
}

fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return Some(Value::Null);
    }

    return serde_json::from_str(body).ok();
}

fn backend_message(body: &Value) -> Option<String> {
    return body
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| return !message.trim().is_empty())
        .map(|message| return message.to_string());
}

fn first_message(messages: &Value) -> Option<String> {
    let message = match messages {
        Value::String(message) => Some(message.as_str()),
        Value::Array(list) => list.first().and_then(Value::as_str),
        _ => None,
    };

    return message
        .filter(|message| return !message.trim().is_empty())
        .map(|message| return message.to_string());
}

/// First message of the first field in a `{errors: {field: [messages]}}`
/// body.
fn validation_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ValidationBody>(body).ok()?;
    let FieldErrors(entries) = parsed.errors?;
    let (_, messages) = entries.first()?;
    return first_message(messages);
}

/// Turns a raw response into either its JSON body or a normalized error.
///
/// A 401 always evicts the stored credential and, unless the caller is
/// already signing in, triggers a single redirect to the sign-in flow.
pub fn handle_response(
    status: u16,
    body: &str,
    credentials: &dyn CredentialStore,
    redirect: &dyn AuthRedirect,
) -> ApiResult<Value> {
    let parsed = parse_body(body);

    if (200..300).contains(&status) {
        return parsed.ok_or_else(|| {
            tracing::error!(status = status, "Response body is not valid JSON");
            return ApiError::with_status(
                status,
                "Unexpected response from server: body is not valid JSON",
            );
        });
    }

    let parsed = parsed.unwrap_or(Value::Null);
    let message = backend_message(&parsed).unwrap_or_else(|| return status_message(status));

    match status {
        401 => {
            tracing::warn!("Credential rejected by the backend, clearing stored token");
            if let Err(err) = credentials.clear() {
                tracing::error!(error = ?err, "Failed to clear stored credential");
            }
            if !redirect.is_on_auth_view() {
                redirect.redirect_to_auth();
            }
            return Err(ApiError::with_status(status, message));
        }
        422 => {
            let message = validation_message(body).unwrap_or(message);
            return Err(ApiError::with_status(status, message));
        }
        _ => {
            tracing::debug!(status = status, reason = %message, "Request failed");
            return Err(ApiError::with_status(status, message));
        }
    }
}
