//! # edgequake-md2notion
//!
//! Upload Markdown documents containing LaTeX math and local images to Notion.
//!
//! ## Why this crate?
//!
//! Notion's API does not accept Markdown. It wants typed blocks, caps rich-text
//! runs at 2000 characters and requests at 100 blocks, renders math with KaTeX
//! (which rejects several constructs that pandoc or hand-written notes
//! produce), and only embeds images by public URL. This crate turns a Markdown
//! file into a valid block sequence and uploads it in compliant chunks.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Segment   split on blank lines; $$…$$ segments become equations
//!  ├─ 2. Images    ![alt](path) → Imgur URL (placeholder paragraph on failure)
//!  ├─ 3. Inline    $…$ spans → equation fragments, text → 2000-char chunks
//!  ├─ 4. Math      pandoc → KaTeX rules → a = b \mid c  ⇒  a = \frac{b}{c}
//!  └─ 5. Publish   create page with 100 blocks, append the rest in order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2notion::{upload_file, ParentRef, UploadConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UploadConfig::builder()
//!         .notion_token(std::env::var("NOTION_API_KEY")?)
//!         .parent(ParentRef::page("0123456789abcdef0123456789abcdef"))
//!         .imgur_client_id(std::env::var("IMGUR_CLIENT_ID")?)
//!         .image_folder("notes/images")
//!         .build()?;
//!     let output = upload_file("notes/lecture.md", &config).await?;
//!     println!("created page {}", output.page_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2notion` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-md2notion = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod block;
pub mod config;
pub mod convert;
pub mod error;
pub mod imgur;
pub mod notion;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use block::{Block, MathExpression, TextFragment, BLOCKS_PER_REQUEST, TEXT_CHUNK_LIMIT};
pub use config::{UploadConfig, UploadConfigBuilder};
pub use convert::{
    convert_file, convert_markdown, convert_markdown_with, convert_to_file, upload, upload_file,
    upload_sync, upload_with,
};
pub use error::{ImageUploadError, Md2NotionError, NotionApiError, TranslationError};
pub use imgur::{ImageHost, ImgurClient, NoImageHost};
pub use notion::{DocumentApi, NotionClient, ParentKind, ParentRef};
pub use output::{ConversionOutput, ConversionStats, UploadOutput};
pub use progress::{NoopProgressCallback, ProgressCallback, UploadProgressCallback};
pub use translate::{DisabledTranslator, MathTranslator, PandocTranslator};
