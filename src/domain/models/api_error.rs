#[cfg(test)]
#[path = "api_error_test.rs"]
mod tests;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error: unable to reach the server";
pub const TIMEOUT_ERROR_MESSAGE: &str = "Network error: the request timed out";

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The single error surfaced by the API client. Its message has already been
/// normalized by the transport and can be shown to the user as-is.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: Option<u16>,
}

impl ApiError {
    pub fn new<S: Into<String>>(message: S) -> ApiError {
        return ApiError {
            message: message.into(),
            status: None,
        };
    }

    pub(crate) fn with_status<S: Into<String>>(status: u16, message: S) -> ApiError {
        return ApiError {
            message: message.into(),
            status: Some(status),
        };
    }

    pub fn network() -> ApiError {
        return ApiError::new(NETWORK_ERROR_MESSAGE);
    }

    pub fn timeout() -> ApiError {
        return ApiError::new(TIMEOUT_ERROR_MESSAGE);
    }

    pub fn message(&self) -> &str {
        return &self.message;
    }

    pub(crate) fn status(&self) -> Option<u16> {
        return self.status;
    }

    pub fn is_network(&self) -> bool {
        return self.status.is_none() && self.message.starts_with("Network error");
    }
}
