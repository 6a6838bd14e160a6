use std::path;

use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use tokio::fs;

/// A file read into memory and ready to be sent as a multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: &str, mime: &str, bytes: Vec<u8>) -> UploadFile {
        return UploadFile {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        };
    }

    pub async fn from_path(file_path: &path::Path) -> Result<UploadFile> {
        let bytes = fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map(|name| return name.to_string_lossy().to_string())
            .unwrap_or_else(|| return "upload".to_string());
        let mime = mime_guess::from_path(file_path)
            .first_or_octet_stream()
            .to_string();

        return Ok(UploadFile {
            file_name,
            mime,
            bytes,
        });
    }

    pub fn size(&self) -> u64 {
        return self.bytes.len() as u64;
    }
}

/// Where the backend stored an uploaded product photo.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedProduct {
    #[serde(alias = "image_path")]
    pub path: String,
    #[serde(default)]
    pub url: Option<String>,
}
