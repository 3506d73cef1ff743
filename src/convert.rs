//! Conversion and upload entry points.
//!
//! Two families of functions:
//!
//! * `convert*`: Markdown → [`ConversionOutput`] without touching Notion.
//!   Images are still hosted when an Imgur client id is configured.
//! * `upload*`: convert, then publish the blocks as a new Notion page.
//!
//! The `*_with` variants take the three capabilities explicitly, which is how
//! tests and embedders swap in their own translator, image host, or Notion
//! client. Everything else builds the production capabilities from
//! [`UploadConfig`].

use crate::config::UploadConfig;
use crate::error::Md2NotionError;
use crate::imgur::{ImageHost, ImgurClient, NoImageHost};
use crate::notion::{DocumentApi, NotionClient};
use crate::output::{ConversionOutput, ConversionStats, UploadOutput};
use crate::pipeline::publish::publish;
use crate::pipeline::segment::Segmenter;
use crate::translate::{DisabledTranslator, MathTranslator, PandocTranslator};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert Markdown text using explicitly supplied capabilities.
pub async fn convert_markdown_with(
    markdown: &str,
    image_folder: &Path,
    translator: &dyn MathTranslator,
    images: &dyn ImageHost,
) -> ConversionOutput {
    let start = Instant::now();
    let segmenter = Segmenter {
        translator,
        images,
        image_folder,
    };
    let output = segmenter.segment_document(markdown).await;
    info!(
        "Converted {} segments into {} blocks in {}ms ({} failed images)",
        output.stats.segments,
        output.blocks.len(),
        start.elapsed().as_millis(),
        output.stats.failed_images
    );
    output
}

/// Convert Markdown text with the capabilities described by `config`.
pub async fn convert_markdown(
    markdown: &str,
    config: &UploadConfig,
) -> Result<ConversionOutput, Md2NotionError> {
    let translator = build_translator(config);
    let images = build_image_host(config)?;
    Ok(convert_markdown_with(markdown, &config.image_folder, translator.as_ref(), images.as_ref()).await)
}

/// Read and convert a Markdown file.
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &UploadConfig,
) -> Result<ConversionOutput, Md2NotionError> {
    let markdown = read_markdown(path.as_ref()).await?;
    convert_markdown(&markdown, config).await
}

/// Convert a Markdown file and write the Notion block JSON to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &UploadConfig,
) -> Result<ConversionStats, Md2NotionError> {
    let output = convert_file(input, config).await?;
    let path = output_path.as_ref();
    let write_err = |source| Md2NotionError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(&output.blocks)
        .map_err(|e| Md2NotionError::Internal(format!("serialise blocks: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(output.stats)
}

/// Convert Markdown and publish it with explicitly supplied capabilities.
///
/// Only `config.parent`, `config.title` and `config.progress_callback` are
/// read; the capabilities replace everything else.
pub async fn upload_with(
    markdown: &str,
    config: &UploadConfig,
    translator: &dyn MathTranslator,
    images: &dyn ImageHost,
    api: &dyn DocumentApi,
) -> Result<UploadOutput, Md2NotionError> {
    let parent = config
        .parent
        .as_ref()
        .ok_or_else(|| Md2NotionError::NotionNotConfigured {
            hint: "no parent database or page given (--parent-type / --parent-id)".into(),
        })?;

    let output = convert_markdown_with(markdown, &config.image_folder, translator, images).await;
    let title = config.page_title();
    let published = publish(
        &output.blocks,
        &title,
        parent,
        api,
        config.progress_callback.as_deref(),
    )
    .await?;

    info!(
        "Markdown uploaded as page {} ({} blocks in {} chunks)",
        published.page_id, published.blocks, published.chunks
    );
    Ok(UploadOutput {
        page_id: published.page_id,
        chunks: published.chunks,
        blocks_uploaded: published.blocks,
        stats: output.stats,
    })
}

/// Convert Markdown text and publish it as a new Notion page.
///
/// # Errors
/// - [`Md2NotionError::NotionNotConfigured`] without token or parent
/// - [`Md2NotionError::PageCreationFailed`] when the first request is rejected
/// - [`Md2NotionError::ChunkAppendFailed`] when a later chunk is rejected;
///   the page exists and holds every earlier chunk
pub async fn upload(markdown: &str, config: &UploadConfig) -> Result<UploadOutput, Md2NotionError> {
    let api = build_notion_client(config)?;
    let translator = build_translator(config);
    let images = build_image_host(config)?;
    upload_with(markdown, config, translator.as_ref(), images.as_ref(), &api).await
}

/// Read a Markdown file and publish it as a new Notion page.
pub async fn upload_file(
    path: impl AsRef<Path>,
    config: &UploadConfig,
) -> Result<UploadOutput, Md2NotionError> {
    // Fail on credentials before doing any image uploads.
    build_notion_client(config)?;
    let markdown = read_markdown(path.as_ref()).await?;
    upload(&markdown, config).await
}

/// Synchronous wrapper around [`upload_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn upload_sync(
    path: impl AsRef<Path>,
    config: &UploadConfig,
) -> Result<UploadOutput, Md2NotionError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2NotionError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(upload_file(path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Read a UTF-8 Markdown file, mapping the common failures.
async fn read_markdown(path: &Path) -> Result<String, Md2NotionError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            debug!("Read {} bytes from {}", text.len(), path.display());
            Ok(text)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Md2NotionError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Md2NotionError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(Md2NotionError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn build_translator(config: &UploadConfig) -> Box<dyn MathTranslator> {
    if config.translate_math {
        Box::new(PandocTranslator::new(
            config.pandoc_path.clone(),
            config.pandoc_timeout_secs,
        ))
    } else {
        Box::new(DisabledTranslator)
    }
}

fn build_image_host(config: &UploadConfig) -> Result<Box<dyn ImageHost>, Md2NotionError> {
    match config.imgur_client_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let client = ImgurClient::new(id, config.imgur_base_url.clone(), config.http_timeout_secs)
                .map_err(|e| Md2NotionError::Internal(format!("imgur client: {e}")))?;
            Ok(Box::new(client))
        }
        None => {
            debug!("No Imgur client id; local images will be placeholders");
            Ok(Box::new(NoImageHost))
        }
    }
}

fn build_notion_client(config: &UploadConfig) -> Result<NotionClient, Md2NotionError> {
    let token = config
        .notion_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Md2NotionError::NotionNotConfigured {
            hint: "no Notion API key given (--notion-token or NOTION_API_KEY)".into(),
        })?;
    if config.parent.is_none() {
        return Err(Md2NotionError::NotionNotConfigured {
            hint: "no parent database or page given (--parent-type / --parent-id)".into(),
        });
    }
    NotionClient::new(
        token,
        config.notion_base_url.clone(),
        config.notion_version.clone(),
        config.http_timeout_secs,
    )
    .map_err(|e| Md2NotionError::Internal(format!("notion client: {e}")))
}
