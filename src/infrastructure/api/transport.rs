#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;

use std::time::Duration;

use reqwest::header;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::Method;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;

use super::handle_response;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ApiError;
use crate::domain::models::ApiResult;
use crate::domain::models::AuthRedirectBox;
use crate::domain::models::CredentialStoreBox;
use crate::domain::models::UploadFile;

fn normalize_network_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        tracing::error!(error = ?err, "Request timed out");
        return ApiError::timeout();
    }

    tracing::error!(error = ?err, "No response received from the server");
    return ApiError::network();
}

pub fn file_part(file: &UploadFile) -> ApiResult<Part> {
    return Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime)
        .map_err(|err| {
            return ApiError::new(format!(
                "{} has an invalid content type: {err}",
                file.file_name
            ));
        });
}

/// Authenticated HTTP access to a single API base URL. Every request carries
/// the stored bearer token when one exists, and every response goes through
/// `handle_response` before reaching the caller.
pub struct Transport {
    base_url: String,
    http: reqwest::Client,
    credentials: CredentialStoreBox,
    redirect: AuthRedirectBox,
}

impl Transport {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: CredentialStoreBox,
        redirect: AuthRedirectBox,
    ) -> ApiResult<Transport> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to build HTTP client");
                return ApiError::new(format!("Failed to build HTTP client: {err}"));
            })?;

        return Ok(Transport {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            credentials,
            redirect,
        });
    }

    pub fn from_config(
        credentials: CredentialStoreBox,
        redirect: AuthRedirectBox,
    ) -> anyhow::Result<Transport> {
        let transport = Transport::new(
            &Config::get(ConfigKey::ApiUrl),
            Config::get_duration(ConfigKey::RequestTimeout)?,
            credentials,
            redirect,
        )?;

        return Ok(transport);
    }

    pub fn base_url(&self) -> &str {
        return &self.base_url;
    }

    pub fn credentials(&self) -> &CredentialStoreBox {
        return &self.credentials;
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.credentials.get() {
            return builder.bearer_auth(token);
        }

        return builder;
    }

    fn json_request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .header(header::CONTENT_TYPE, "application/json");

        return self.authorize(builder);
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<Value> {
        let mut builder = self.json_request(Method::GET, path);
        if !query.is_empty() {
            builder = builder.query(query);
        }

        return self.send(builder).await;
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ApiResult<Value> {
        let builder = self.json_request(Method::POST, path).json(body);
        return self.send(builder).await;
    }

    pub async fn post_empty(&self, path: &str) -> ApiResult<Value> {
        let builder = self.json_request(Method::POST, path);
        return self.send(builder).await;
    }

    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ApiResult<Value> {
        let builder = self.json_request(Method::PUT, path).json(body);
        return self.send(builder).await;
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        let builder = self.json_request(Method::DELETE, path);
        return self.send(builder).await;
    }

    /// Multipart bodies skip the JSON content type so reqwest can set the
    /// boundary-encoded one. The bearer token is still attached.
    pub async fn post_multipart(&self, path: &str, form: Form) -> ApiResult<Value> {
        let builder = self
            .http
            .post(format!("{}{path}", self.base_url))
            .multipart(form);

        return self.send(self.authorize(builder)).await;
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Value> {
        let req = builder.build().map_err(|err| {
            tracing::error!(error = ?err, "Failed to build request");
            return ApiError::new(format!("Invalid request: {err}"));
        })?;

        let method = req.method().to_string();
        let path = req.url().path().to_string();
        tracing::debug!(method = %method, path = %path, "Sending request");

        let res = self
            .http
            .execute(req)
            .await
            .map_err(normalize_network_error)?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(normalize_network_error)?;

        tracing::debug!(
            method = %method,
            path = %path,
            status = status,
            "Received response"
        );

        return handle_response(
            status,
            &body,
            self.credentials.as_ref(),
            self.redirect.as_ref(),
        );
    }
}
