//! Block segmentation: whole Markdown document → ordered Notion blocks.
//!
//! The document is cut at every blank line (`"\n\n"`). Each non-empty segment
//! is then handled in one of two ways:
//!
//! 1. **Display math**: the trimmed segment is `$$…$$` as a whole. It becomes
//!    a single equation block and is not scanned for images or inline math.
//! 2. **Mixed content**: `![alt](path)` references split the segment; text
//!    between them becomes paragraph blocks via [`split_inline`], each image
//!    becomes an image block, or a placeholder paragraph when hosting fails.
//!    References that are already `http(s)://` URLs are emitted as image
//!    blocks directly; the image host is only asked for local files.

use crate::block::Block;
use crate::imgur::{is_url, resolve_image_path, ImageHost};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::inline::split_inline;
use crate::pipeline::math::convert_math;
use crate::translate::MathTranslator;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

static RE_BLOCK_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*\$\$(.*?)\$\$\s*$").unwrap());

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

/// Capabilities and settings needed to segment a document.
pub struct Segmenter<'a> {
    pub translator: &'a dyn MathTranslator,
    pub images: &'a dyn ImageHost,
    /// Folder local image references are resolved against.
    pub image_folder: &'a Path,
}

impl Segmenter<'_> {
    /// Convert `document` into blocks in document order.
    pub async fn segment(&self, document: &str) -> Vec<Block> {
        self.segment_document(document).await.blocks
    }

    /// Like [`Segmenter::segment`], also returning conversion counters.
    pub async fn segment_document(&self, document: &str) -> ConversionOutput {
        let document = document.replace("\r\n", "\n");
        let mut out = ConversionOutput::default();

        for segment in document.split("\n\n") {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            out.stats.segments += 1;
            self.segment_one(segment, &mut out.blocks, &mut out.stats).await;
        }

        debug!(
            "Segmented {} segments into {} blocks",
            out.stats.segments,
            out.blocks.len()
        );
        out
    }

    async fn segment_one(&self, segment: &str, blocks: &mut Vec<Block>, stats: &mut ConversionStats) {
        if let Some(caps) = RE_BLOCK_MATH.captures(segment) {
            let expr = convert_math(caps[1].trim(), self.translator).await;
            emit(blocks, stats, Block::Equation(expr));
            return;
        }

        let mut last_end = 0;
        for caps in RE_IMAGE.captures_iter(segment) {
            let Some(whole) = caps.get(0) else { continue };
            if let Some(block) = self.paragraph(&segment[last_end..whole.start()]).await {
                emit(blocks, stats, block);
            }

            let reference = &caps[2];
            match self.image(reference).await {
                Some(url) => emit(blocks, stats, Block::Image(url)),
                None => {
                    stats.failed_images += 1;
                    let placeholder = Block::text(&format!("[Image upload failed: {reference}]"));
                    emit(blocks, stats, placeholder);
                }
            }
            last_end = whole.end();
        }

        if let Some(block) = self.paragraph(&segment[last_end..]).await {
            emit(blocks, stats, block);
        }
    }

    async fn paragraph(&self, text: &str) -> Option<Block> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Block::Paragraph(split_inline(text, self.translator).await))
    }

    /// Host an image reference, returning `None` when it cannot be hosted.
    async fn image(&self, reference: &str) -> Option<String> {
        if is_url(reference) {
            return Some(reference.to_string());
        }
        let path = resolve_image_path(self.image_folder, reference);
        match self.images.upload(&path).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Failed to upload {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn emit(blocks: &mut Vec<Block>, stats: &mut ConversionStats, block: Block) {
    stats.record(&block);
    blocks.push(block);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TextFragment;
    use crate::error::ImageUploadError;
    use crate::imgur::NoImageHost;
    use crate::output::paragraph_text;
    use crate::translate::DisabledTranslator;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Hosts every image under a fake CDN and records requested paths.
    #[derive(Default)]
    struct FakeHost {
        seen: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl ImageHost for FakeHost {
        async fn upload(&self, path: &Path) -> Result<String, ImageUploadError> {
            self.seen.lock().unwrap().push(path.to_path_buf());
            let name = path.file_name().unwrap().to_string_lossy();
            Ok(format!("https://cdn.test/{name}"))
        }
    }

    async fn run(doc: &str, images: &dyn ImageHost) -> ConversionOutput {
        Segmenter {
            translator: &DisabledTranslator,
            images,
            image_folder: Path::new("/imgs"),
        }
        .segment_document(doc)
        .await
    }

    #[tokio::test]
    async fn paragraph_equation_paragraph() {
        let out = run("para one\n\n$$x=y\\mid z$$\n\npara two", &NoImageHost).await;
        assert_eq!(out.blocks.len(), 3);
        assert!(matches!(out.blocks[0], Block::Paragraph(_)));
        match &out.blocks[1] {
            Block::Equation(e) => assert_eq!(e, r"x = \frac{y}{z}"),
            other => panic!("expected equation, got {other:?}"),
        }
        assert!(matches!(out.blocks[2], Block::Paragraph(_)));
    }

    #[tokio::test]
    async fn multiline_block_math() {
        let out = run("$$\na + b\n= c\n$$", &NoImageHost).await;
        assert_eq!(out.blocks, vec![Block::Equation("a + b\n= c".into())]);
    }

    #[tokio::test]
    async fn block_math_with_image_syntax_is_not_scanned() {
        let host = FakeHost::default();
        let out = run("$$ ![a](b.png) $$", &host).await;
        assert_eq!(out.blocks.len(), 1);
        assert!(matches!(out.blocks[0], Block::Equation(_)));
        assert!(host.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn images_split_paragraphs() {
        let host = FakeHost::default();
        let out = run("Before ![fig](plots/a.png) middle $x$ ![g](b.png) after", &host).await;
        let kinds: Vec<_> = out.blocks.iter().map(Block::kind).collect();
        assert_eq!(
            kinds,
            vec!["paragraph", "image", "paragraph", "image", "paragraph"]
        );
        assert_eq!(out.blocks[1], Block::Image("https://cdn.test/a.png".into()));
        assert_eq!(
            *host.seen.lock().unwrap(),
            vec![PathBuf::from("/imgs/a.png"), PathBuf::from("/imgs/b.png")]
        );
        assert_eq!(out.stats.inline_equations, 1);
    }

    #[tokio::test]
    async fn failed_image_becomes_placeholder() {
        let out = run("![alt](missing.png)", &NoImageHost).await;
        assert_eq!(out.blocks.len(), 1);
        match &out.blocks[0] {
            Block::Paragraph(frags) => {
                assert_eq!(frags.len(), 1);
                let text = paragraph_text(frags);
                assert!(text.contains("missing.png"));
                assert!(text.contains("failed"));
                assert!(matches!(frags[0], TextFragment::Text(_)));
            }
            other => panic!("expected placeholder paragraph, got {other:?}"),
        }
        assert_eq!(out.stats.failed_images, 1);
    }

    #[tokio::test]
    async fn remote_image_url_bypasses_image_host() {
        let host = FakeHost::default();
        let out = run("![logo](https://example.org/logo.png)", &host).await;
        assert_eq!(
            out.blocks,
            vec![Block::Image("https://example.org/logo.png".into())]
        );
        assert!(host.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_segments_are_skipped() {
        let out = run("\n\n   \n\nonly\n\n\n\n", &NoImageHost).await;
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.stats.segments, 1);
    }

    #[tokio::test]
    async fn crlf_input_is_segmented() {
        let blocks = Segmenter {
            translator: &DisabledTranslator,
            images: &NoImageHost,
            image_folder: Path::new("."),
        }
        .segment("one\r\n\r\ntwo")
        .await;
        assert_eq!(blocks, vec![Block::text("one"), Block::text("two")]);
    }
}
