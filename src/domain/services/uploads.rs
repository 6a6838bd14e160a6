#[cfg(test)]
#[path = "uploads_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use base64::Engine;

use crate::domain::models::UploadFile;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Rejects files the generation backend will not accept before any bytes are
/// sent.
pub fn validate_image_file(file: &UploadFile) -> Result<()> {
    let extension = file
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| return ext.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        bail!(format!(
            "{} is not a supported image. Use one of: {}",
            file.file_name,
            ALLOWED_EXTENSIONS.join(", ")
        ));
    }

    if file.size() == 0 {
        bail!(format!("{} is empty", file.file_name));
    }

    if file.size() > MAX_UPLOAD_BYTES {
        bail!(format!(
            "{} is {:.1} MB. Images must be 10 MB or smaller",
            file.file_name,
            file.size() as f64 / (1024.0 * 1024.0)
        ));
    }

    return Ok(());
}

/// Inline `data:` URL suitable for previewing an image before upload.
pub fn to_base64_preview(file: &UploadFile) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
    return format!("data:{};base64,{encoded}", file.mime);
}
