//! Error types for the edgequake-md2notion library.
//!
//! Two tiers of failure exist:
//!
//! * [`Md2NotionError`] is **fatal**: the upload cannot proceed or was cut
//!   short (unreadable Markdown file, missing Notion token, page creation or
//!   chunk append rejected). Returned as `Err(Md2NotionError)` from the
//!   top-level `upload*` functions.
//!
//! * Capability errors: [`TranslationError`], [`ImageUploadError`] and
//!   [`NotionApiError`] are produced by the external collaborators. The first
//!   two are recovered inside the pipeline (heuristic math fallback, visible
//!   image placeholder); Notion errors are wrapped into the fatal tier.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-md2notion library.
#[derive(Debug, Error)]
pub enum Md2NotionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Markdown file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read Markdown file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Notion errors ─────────────────────────────────────────────────────
    /// Parent type was neither `database` nor `page`.
    #[error("Invalid parent type '{value}'. Must be 'database' or 'page'.")]
    InvalidParentType { value: String },

    /// Token or parent is missing.
    #[error("Notion is not configured: {hint}")]
    NotionNotConfigured { hint: String },

    /// The page (and its first chunk of blocks) could not be created.
    #[error("Failed to create a new Notion page: {source}")]
    PageCreationFailed {
        #[source]
        source: NotionApiError,
    },

    /// The page was created but a later chunk was rejected.
    ///
    /// `chunk` is 0-based; chunk 0 travels with page creation, so the
    /// message also names the 1-based request. Chunks before `chunk` remain
    /// committed on the page.
    #[error(
        "Failed to upload chunk index {chunk} (request {request} of {total_chunks}) \
         to page {page_id} ({blocks_committed} blocks already committed): {source}",
        request = .chunk + 1
    )]
    ChunkAppendFailed {
        page_id: String,
        chunk: usize,
        total_chunks: usize,
        blocks_committed: usize,
        #[source]
        source: NotionApiError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the dry-run JSON output.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of the external math translator.
///
/// Never escapes [`crate::pipeline::math::convert_math`]; the converter falls
/// back to heuristic normalisation instead.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Translation is disabled or the executable could not be started.
    #[error("math translator unavailable: {0}")]
    Unavailable(String),

    /// The translator ran but exited unsuccessfully.
    #[error("math translator exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The translator did not finish in time.
    #[error("math translator timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Pipe I/O with the translator process failed.
    #[error("math translator I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to host a local image.
///
/// Recovered by the segmenter, which emits a placeholder paragraph.
#[derive(Debug, Error)]
pub enum ImageUploadError {
    /// The local file could not be read.
    #[error("cannot read image '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image host answered with a non-success status.
    #[error("image host rejected upload (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// Transport-level failure.
    #[error("image upload request failed: {0}")]
    Http(String),

    /// Success response without a usable link.
    #[error("image host response did not contain a link")]
    MissingLink,

    /// No image host credentials were configured.
    #[error("no image host configured")]
    NotConfigured,
}

/// An error reported by (or while talking to) the Notion API.
#[derive(Debug, Clone, Error)]
#[error("{}", describe_notion_error(.status, .code, .message))]
pub struct NotionApiError {
    /// HTTP status, absent for transport failures.
    pub status: Option<u16>,
    /// Notion's machine-readable error code (e.g. `validation_error`).
    pub code: Option<String>,
    pub message: String,
}

impl NotionApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }
}

fn describe_notion_error(status: &Option<u16>, code: &Option<String>, message: &str) -> String {
    match (status, code) {
        (Some(s), Some(c)) => format!("HTTP {s} {c}: {message}"),
        (Some(s), None) => format!("HTTP {s}: {message}"),
        (None, _) => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_append_display_names_chunk_and_page() {
        let e = Md2NotionError::ChunkAppendFailed {
            page_id: "abc123".into(),
            chunk: 2,
            total_chunks: 3,
            blocks_committed: 200,
            source: NotionApiError {
                status: Some(400),
                code: Some("validation_error".into()),
                message: "body failed validation".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("chunk index 2 (request 3 of 3)"), "got: {msg}");
        assert!(msg.contains("abc123"), "got: {msg}");
        assert!(msg.contains("validation_error"), "got: {msg}");
    }

    #[test]
    fn notion_http_error_display() {
        let e = NotionApiError {
            status: Some(400),
            code: Some("validation_error".into()),
            message: "bad".into(),
        };
        assert_eq!(e.to_string(), "HTTP 400 validation_error: bad");
        let e = NotionApiError {
            status: Some(502),
            code: None,
            message: "Bad Gateway".into(),
        };
        assert_eq!(e.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn notion_transport_error_display() {
        let e = NotionApiError::transport("connection reset");
        assert_eq!(e.to_string(), "connection reset");
    }

    #[test]
    fn invalid_parent_type_display() {
        let e = Md2NotionError::InvalidParentType {
            value: "workspace".into(),
        };
        assert!(e.to_string().contains("'workspace'"));
    }

    #[test]
    fn translation_timeout_display() {
        let e = TranslationError::Timeout { secs: 30 };
        assert!(e.to_string().contains("30s"));
    }
}
