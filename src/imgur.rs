//! Image hosting capability: local image file → public URL.
//!
//! Notion only embeds images by URL, so every local `![alt](path)` reference
//! must be uploaded somewhere first. The production host is Imgur's anonymous
//! upload endpoint (`Authorization: Client-ID …`).

use crate::error::ImageUploadError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default Imgur API base URL.
pub const IMGUR_API_BASE: &str = "https://api.imgur.com";

/// Upload a local image and return a publicly reachable URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<String, ImageUploadError>;
}

/// Map an image reference to a file inside `image_folder`.
///
/// Only the final component of `reference` is kept, so `figures/plot.png`
/// and `plot.png` both resolve to `<image_folder>/plot.png`.
pub fn resolve_image_path(image_folder: &Path, reference: &str) -> PathBuf {
    let name = Path::new(reference)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| reference.into());
    let joined = image_folder.join(name);
    std::path::absolute(&joined).unwrap_or(joined)
}

/// Check if an image reference is already a remote URL.
pub fn is_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Imgur upload client.
#[derive(Debug, Clone)]
pub struct ImgurClient {
    http: reqwest::Client,
    client_id: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ImgurResponse {
    data: Option<ImgurData>,
}

#[derive(Deserialize)]
struct ImgurData {
    link: Option<String>,
}

impl ImgurClient {
    pub fn new(
        client_id: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ImageUploadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ImageUploadError::Http(e.to_string()))?;
        Ok(Self {
            http,
            client_id: client_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageHost for ImgurClient {
    async fn upload(&self, path: &Path) -> Result<String, ImageUploadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ImageUploadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Uploading {} ({} bytes)", path.display(), bytes.len());

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(format!("{}/3/upload", self.base_url))
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageUploadError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageUploadError::Rejected {
                status: status.as_u16(),
                detail: response.text().await.unwrap_or_default(),
            });
        }

        let body: ImgurResponse = response
            .json()
            .await
            .map_err(|e| ImageUploadError::Http(e.to_string()))?;
        let link = body
            .data
            .and_then(|d| d.link)
            .ok_or(ImageUploadError::MissingLink)?;

        info!("Uploaded {} → {}", path.display(), link);
        Ok(link)
    }
}

/// Image host used when no Imgur client id is configured.
///
/// Every upload fails, so local images degrade to placeholder paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImageHost;

#[async_trait]
impl ImageHost for NoImageHost {
    async fn upload(&self, _path: &Path) -> Result<String, ImageUploadError> {
        Err(ImageUploadError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_keeps_only_file_name() {
        let folder = Path::new("/data/images");
        assert_eq!(
            resolve_image_path(folder, "figures/plot.png"),
            PathBuf::from("/data/images/plot.png")
        );
        assert_eq!(
            resolve_image_path(folder, "plot.png"),
            PathBuf::from("/data/images/plot.png")
        );
    }

    #[test]
    fn resolve_relative_folder_is_absolute() {
        assert!(resolve_image_path(Path::new("imgs"), "a.png").is_absolute());
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://i.imgur.com/a.png"));
        assert!(is_url("http://example.org/b.jpg"));
        assert!(!is_url("images/c.png"));
    }

    #[tokio::test]
    async fn no_image_host_always_fails() {
        let err = NoImageHost.upload(Path::new("x.png")).await.unwrap_err();
        assert!(matches!(err, ImageUploadError::NotConfigured));
    }

    #[tokio::test]
    async fn imgur_missing_file_is_read_error() {
        let client = ImgurClient::new("id", IMGUR_API_BASE, 5).unwrap();
        let err = client
            .upload(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageUploadError::Read { .. }));
    }
}
