//! Progress-callback trait for upload events.
//!
//! Inject an [`Arc<dyn UploadProgressCallback>`] via
//! [`crate::config::UploadConfigBuilder::progress_callback`] to receive events
//! as the publisher creates the page and appends each chunk.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2notion::{UploadConfig, UploadProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl UploadProgressCallback for Printer {
//!     fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, blocks: usize) {
//!         eprintln!("chunk {}/{} ({} blocks)", chunk + 1, total_chunks, blocks);
//!     }
//! }
//!
//! let config = UploadConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn UploadProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the publisher as chunks are sent.
///
/// Chunk indices are 0-based; chunk 0 is sent with page creation. All methods
/// default to no-ops.
pub trait UploadProgressCallback: Send + Sync {
    /// Called once before the create request.
    fn on_upload_start(&self, total_blocks: usize, total_chunks: usize) {
        let _ = (total_blocks, total_chunks);
    }

    /// Called once the page exists.
    fn on_page_created(&self, page_id: &str) {
        let _ = page_id;
    }

    /// Called after each accepted chunk, including chunk 0.
    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, blocks: usize) {
        let _ = (chunk, total_chunks, blocks);
    }

    /// Called when a chunk is rejected; no further chunks follow.
    fn on_chunk_error(&self, chunk: usize, total_chunks: usize, error: &str) {
        let _ = (chunk, total_chunks, error);
    }

    /// Called after every chunk has been accepted.
    fn on_upload_complete(&self, page_id: &str, total_blocks: usize) {
        let _ = (page_id, total_blocks);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::UploadConfig`].
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;
