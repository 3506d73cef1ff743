//! Result types returned by conversion and upload.

use crate::block::Block;
use serde::Serialize;

/// Blocks produced from one Markdown document plus counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionOutput {
    /// Notion blocks in document order.
    pub blocks: Vec<Block>,
    pub stats: ConversionStats,
}

/// Counters collected during segmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Non-empty blank-line delimited segments.
    pub segments: usize,
    pub paragraph_blocks: usize,
    pub equation_blocks: usize,
    pub image_blocks: usize,
    /// Equations embedded in paragraph rich text.
    pub inline_equations: usize,
    /// Image references replaced by a placeholder paragraph.
    pub failed_images: usize,
}

impl ConversionStats {
    /// Count a freshly emitted block.
    pub(crate) fn record(&mut self, block: &Block) {
        match block {
            Block::Paragraph(frags) => {
                self.paragraph_blocks += 1;
                self.inline_equations += frags.iter().filter(|f| f.is_equation()).count();
            }
            Block::Equation(_) => self.equation_blocks += 1,
            Block::Image(_) => self.image_blocks += 1,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.paragraph_blocks + self.equation_blocks + self.image_blocks
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutput {
    /// Identifier of the created Notion page.
    pub page_id: String,
    /// Number of requests sent (one create plus the appends).
    pub chunks: usize,
    pub blocks_uploaded: usize,
    pub stats: ConversionStats,
}

/// Concatenated plain text of a paragraph.
#[cfg(test)]
pub(crate) fn paragraph_text(fragments: &[crate::block::TextFragment]) -> String {
    fragments.iter().map(|f| f.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TextFragment;

    #[test]
    fn record_counts_inline_equations() {
        let mut stats = ConversionStats::default();
        stats.record(&Block::Paragraph(vec![
            TextFragment::Text("a".into()),
            TextFragment::Equation("x".into()),
            TextFragment::Equation("y".into()),
        ]));
        stats.record(&Block::Equation("z".into()));
        stats.record(&Block::Image("https://i.imgur.com/a.png".into()));
        assert_eq!(stats.paragraph_blocks, 1);
        assert_eq!(stats.inline_equations, 2);
        assert_eq!(stats.total_blocks(), 3);
    }

    #[test]
    fn output_serialises_notion_blocks() {
        let out = ConversionOutput {
            blocks: vec![Block::Equation("x".into())],
            stats: ConversionStats::default(),
        };
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["blocks"][0]["type"], "equation");
        assert_eq!(v["stats"]["segments"], 0);
    }
}
