//! Configuration types for Markdown-to-Notion uploads.
//!
//! All behaviour is controlled through [`UploadConfig`], built via its
//! [`UploadConfigBuilder`]. Credentials are plain fields here; where they come
//! from (flags, environment, a secrets manager) is the caller's business.

use crate::error::Md2NotionError;
use crate::imgur::IMGUR_API_BASE;
use crate::notion::{ParentRef, NOTION_API_BASE, NOTION_VERSION};
use crate::progress::{ProgressCallback, UploadProgressCallback};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for converting and uploading one Markdown document.
///
/// # Example
/// ```rust
/// use edgequake_md2notion::{ParentRef, UploadConfig};
///
/// let config = UploadConfig::builder()
///     .notion_token("secret_xxx")
///     .parent(ParentRef::page("0123456789abcdef"))
///     .image_folder("./images")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct UploadConfig {
    /// Notion integration token. Required for uploads, not for dry runs.
    pub notion_token: Option<String>,

    /// Value of the `Notion-Version` header. Default: `2022-06-28`.
    pub notion_version: String,

    /// Notion API base URL. Default: `https://api.notion.com`.
    pub notion_base_url: String,

    /// Database or page the new page is created under.
    pub parent: Option<ParentRef>,

    /// Page title. If None, derived from the parent kind.
    pub title: Option<String>,

    /// Folder that local image references are resolved against. Default: `.`.
    pub image_folder: PathBuf,

    /// Imgur client id. Without it local images become placeholders.
    pub imgur_client_id: Option<String>,

    /// Imgur API base URL. Default: `https://api.imgur.com`.
    pub imgur_base_url: String,

    /// pandoc executable. Default: `pandoc`.
    pub pandoc_path: String,

    /// Run math through pandoc before normalising. Default: true.
    ///
    /// When false, every expression takes the heuristic fallback path.
    pub translate_math: bool,

    /// Per-expression pandoc timeout in seconds. Default: 30.
    pub pandoc_timeout_secs: u64,

    /// Timeout for each Notion / Imgur HTTP request in seconds. Default: 60.
    pub http_timeout_secs: u64,

    /// Optional upload progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            notion_token: None,
            notion_version: NOTION_VERSION.to_string(),
            notion_base_url: NOTION_API_BASE.to_string(),
            parent: None,
            title: None,
            image_folder: PathBuf::from("."),
            imgur_client_id: None,
            imgur_base_url: IMGUR_API_BASE.to_string(),
            pandoc_path: "pandoc".to_string(),
            translate_math: true,
            pandoc_timeout_secs: 30,
            http_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("notion_token", &self.notion_token.as_ref().map(|_| "<redacted>"))
            .field("notion_version", &self.notion_version)
            .field("notion_base_url", &self.notion_base_url)
            .field("parent", &self.parent)
            .field("title", &self.title)
            .field("image_folder", &self.image_folder)
            .field("imgur_client_id", &self.imgur_client_id.as_ref().map(|_| "<redacted>"))
            .field("pandoc_path", &self.pandoc_path)
            .field("translate_math", &self.translate_math)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn UploadProgressCallback>"),
            )
            .finish()
    }
}

impl UploadConfig {
    /// Create a new builder for `UploadConfig`.
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder {
            config: Self::default(),
        }
    }

    /// Configured title, or the parent kind's default.
    pub fn page_title(&self) -> String {
        match (&self.title, &self.parent) {
            (Some(t), _) => t.clone(),
            (None, Some(p)) => p.kind.default_title().to_string(),
            (None, None) => "Uploaded Markdown".to_string(),
        }
    }
}

/// Builder for [`UploadConfig`].
#[derive(Debug)]
pub struct UploadConfigBuilder {
    config: UploadConfig,
}

impl UploadConfigBuilder {
    pub fn notion_token(mut self, token: impl Into<String>) -> Self {
        self.config.notion_token = Some(token.into());
        self
    }

    pub fn notion_version(mut self, version: impl Into<String>) -> Self {
        self.config.notion_version = version.into();
        self
    }

    pub fn notion_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.notion_base_url = url.into();
        self
    }

    pub fn parent(mut self, parent: ParentRef) -> Self {
        self.config.parent = Some(parent);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn image_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.image_folder = folder.into();
        self
    }

    pub fn imgur_client_id(mut self, id: impl Into<String>) -> Self {
        self.config.imgur_client_id = Some(id.into());
        self
    }

    pub fn imgur_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.imgur_base_url = url.into();
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<String>) -> Self {
        self.config.pandoc_path = path.into();
        self
    }

    pub fn translate_math(mut self, v: bool) -> Self {
        self.config.translate_math = v;
        self
    }

    pub fn pandoc_timeout_secs(mut self, secs: u64) -> Self {
        self.config.pandoc_timeout_secs = secs;
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn UploadProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Token and parent are checked later, when an upload actually needs them.
    pub fn build(self) -> Result<UploadConfig, Md2NotionError> {
        let c = &self.config;
        if c.pandoc_timeout_secs == 0 || c.http_timeout_secs == 0 {
            return Err(Md2NotionError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        if c.pandoc_path.trim().is_empty() {
            return Err(Md2NotionError::InvalidConfig(
                "pandoc path must not be empty".into(),
            ));
        }
        if let Some(p) = &c.parent {
            if p.id.trim().is_empty() {
                return Err(Md2NotionError::InvalidConfig(
                    format!("{} id must not be empty", p.kind),
                ));
            }
        }
        Ok(self.config)
    }
}
