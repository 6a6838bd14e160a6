#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use reqwest::multipart::Form;
use serde_json::Value;

use super::file_part;
use super::Transport;
use crate::domain::models::decode;
use crate::domain::models::unwrap_envelope;
use crate::domain::models::unwrap_generation;
use crate::domain::models::unwrap_list;
use crate::domain::models::ApiError;
use crate::domain::models::ApiResult;
use crate::domain::models::AuthSession;
use crate::domain::models::BatchSubmission;
use crate::domain::models::CreatePresetRequest;
use crate::domain::models::GeneratedImage;
use crate::domain::models::LoginRequest;
use crate::domain::models::Preset;
use crate::domain::models::RegisterRequest;
use crate::domain::models::ShotType;
use crate::domain::models::UpdatePresetRequest;
use crate::domain::models::UploadFile;
use crate::domain::models::UploadedProduct;
use crate::domain::models::User;

fn non_empty(text: Option<&str>) -> Option<String> {
    return text
        .map(str::trim)
        .filter(|text| return !text.is_empty())
        .map(|text| return text.to_string());
}

/// One method per backend capability. Each performs a single request and
/// reshapes the payload into the client-side record types.
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    pub fn new(transport: Transport) -> ApiClient {
        return ApiClient { transport };
    }

    pub fn transport(&self) -> &Transport {
        return &self.transport;
    }

    fn persist_session(&self, body: Value) -> ApiResult<AuthSession> {
        let session: AuthSession = decode(unwrap_envelope(body))?;
        self.transport
            .credentials()
            .set(&session.token)
            .map_err(|err| {
                tracing::error!(error = ?err, "Failed to store credential");
                return ApiError::new(format!("Failed to store credential: {err}"));
            })?;

        return Ok(session);
    }

    pub async fn register(&self, req: &RegisterRequest) -> ApiResult<AuthSession> {
        let body = self.transport.post("/register", req).await?;
        return self.persist_session(body);
    }

    pub async fn login(&self, req: &LoginRequest) -> ApiResult<AuthSession> {
        let body = self.transport.post("/login", req).await?;
        return self.persist_session(body);
    }

    /// The stored credential is erased whether or not the backend call
    /// succeeds. A failed call is still returned to the caller.
    pub async fn logout(&self) -> ApiResult<()> {
        let res = self.transport.post_empty("/logout").await;

        if let Err(err) = self.transport.credentials().clear() {
            tracing::error!(error = ?err, "Failed to clear stored credential");
        }

        return res.map(|_| return ());
    }

    pub async fn get_user(&self) -> ApiResult<User> {
        let body = self.transport.get("/user", &[]).await?;
        return decode(unwrap_envelope(body));
    }

    pub async fn upload_product(&self, file: &UploadFile) -> ApiResult<UploadedProduct> {
        let form = Form::new().part("product_image", file_part(file)?);
        let body = self.transport.post_multipart("/upload-product", form).await?;
        return decode(unwrap_envelope(body));
    }

    pub async fn generate_image(
        &self,
        file: &UploadFile,
        shot_type: ShotType,
        description: Option<&str>,
    ) -> ApiResult<GeneratedImage> {
        let mut form = Form::new()
            .part("product_image", file_part(file)?)
            .text("shot_type", shot_type.to_string());
        if let Some(description) = non_empty(description) {
            form = form.text("product_description", description);
        }

        let body = self.transport.post_multipart("/generate", form).await?;
        return GeneratedImage::from_value(unwrap_generation(body));
    }

    pub async fn get_images(&self, search: Option<&str>) -> ApiResult<Vec<GeneratedImage>> {
        let search = non_empty(search);
        let query = match &search {
            Some(text) => vec![("search", text.as_str())],
            None => vec![],
        };

        let body = self.transport.get("/generations", &query).await?;
        return unwrap_list(body)?
            .into_iter()
            .map(GeneratedImage::from_value)
            .collect();
    }

    pub async fn get_image(&self, id: i64) -> ApiResult<GeneratedImage> {
        let body = self.transport.get(&format!("/generation/{id}"), &[]).await?;
        return GeneratedImage::from_value(unwrap_envelope(body));
    }

    /// Succeeds when the image no longer exists, including when it was
    /// already gone.
    pub async fn delete_image(&self, id: i64) -> ApiResult<()> {
        match self.transport.delete(&format!("/generation/{id}")).await {
            Ok(_) => return Ok(()),
            Err(err) if err.status() == Some(404) => {
                tracing::debug!(id = id, "Image was already deleted");
                return Ok(());
            }
            Err(err) => return Err(err),
        }
    }

    pub async fn get_presets(&self) -> ApiResult<Vec<Preset>> {
        let body = self.transport.get("/presets", &[]).await?;
        return unwrap_list(body)?
            .into_iter()
            .map(Preset::from_value)
            .collect();
    }

    pub async fn get_preset(&self, id: i64) -> ApiResult<Preset> {
        let body = self.transport.get(&format!("/presets/{id}"), &[]).await?;
        return Preset::from_value(unwrap_envelope(body));
    }

    pub async fn create_preset(&self, req: &CreatePresetRequest) -> ApiResult<Preset> {
        let body = self.transport.post("/presets", req).await?;
        return Preset::from_value(unwrap_envelope(body));
    }

    pub async fn update_preset(&self, id: i64, req: &UpdatePresetRequest) -> ApiResult<Preset> {
        let body = self.transport.put(&format!("/presets/{id}"), req).await?;
        return Preset::from_value(unwrap_envelope(body));
    }

    pub async fn delete_preset(&self, id: i64) -> ApiResult<()> {
        self.transport.delete(&format!("/presets/{id}")).await?;
        return Ok(());
    }

    /// The backend reads the preset from the form body and ignores the path
    /// parameter, so the id is sent in both places.
    pub async fn apply_preset(
        &self,
        preset_id: i64,
        file: &UploadFile,
        description: Option<&str>,
    ) -> ApiResult<GeneratedImage> {
        let mut form = Form::new()
            .text("preset_id", preset_id.to_string())
            .part("product_image", file_part(file)?);
        if let Some(description) = non_empty(description) {
            form = form.text("product_description", description);
        }

        let body = self
            .transport
            .post_multipart(&format!("/presets/{preset_id}/apply"), form)
            .await?;
        return GeneratedImage::from_value(unwrap_generation(body));
    }

    /// Submits every image in one request. Generation happens in the
    /// background, so only the acknowledgement comes back.
    pub async fn batch_generate(
        &self,
        preset_id: i64,
        files: &[UploadFile],
        descriptions: &[String],
    ) -> ApiResult<BatchSubmission> {
        if files.is_empty() {
            return Err(ApiError::new("Select at least one image to generate"));
        }

        let mut form = Form::new().text("preset_id", preset_id.to_string());
        for file in files {
            form = form.part("product_images[]", file_part(file)?);
        }
        for description in descriptions {
            form = form.text("product_descriptions[]", description.to_string());
        }

        let body = self.transport.post_multipart("/batch-generate", form).await?;
        return decode(unwrap_envelope(body));
    }
}
