//! Notion content model: blocks, rich-text fragments, and their wire shapes.
//!
//! The pipeline only ever produces three block types (paragraph, equation,
//! image) and two rich-text fragment types (text, equation). Every value is
//! created once during segmentation and never mutated afterwards.
//!
//! Notion's JSON uses an "externally named" layout where the payload lives
//! under a key equal to the `type` field:
//!
//! ```text
//! {"object":"block","type":"equation","equation":{"expression":"x^2"}}
//! ```
//!
//! serde's derive cannot express that shape directly, so [`Block`] and
//! [`TextFragment`] implement `Serialize` by hand.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

/// Maximum length (in characters) of a single Notion rich-text `content`.
pub const TEXT_CHUNK_LIMIT: usize = 2000;

/// Maximum number of children Notion accepts per create/append request.
pub const BLOCKS_PER_REQUEST: usize = 100;

/// A math-markup string in the renderer's (KaTeX) dialect.
pub type MathExpression = String;

/// One piece of a paragraph's rich text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextFragment {
    /// Plain text, at most [`TEXT_CHUNK_LIMIT`] characters.
    Text(String),
    /// Inline equation.
    Equation(MathExpression),
}

impl TextFragment {
    pub fn is_equation(&self) -> bool {
        matches!(self, TextFragment::Equation(_))
    }

    /// Text content or equation source, whichever this fragment carries.
    pub fn as_str(&self) -> &str {
        match self {
            TextFragment::Text(s) | TextFragment::Equation(s) => s,
        }
    }
}

impl Serialize for TextFragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            TextFragment::Text(content) => {
                map.serialize_entry("type", "text")?;
                map.serialize_entry("text", &json!({ "content": content }))?;
            }
            TextFragment::Equation(expression) => {
                map.serialize_entry("type", "equation")?;
                map.serialize_entry("equation", &json!({ "expression": expression }))?;
            }
        }
        map.end()
    }
}

/// One structured content unit of the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Rich-text paragraph in reading order.
    Paragraph(Vec<TextFragment>),
    /// Display equation.
    Equation(MathExpression),
    /// Externally hosted image.
    Image(String),
}

impl Block {
    /// Short type name as used by the Notion API.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Equation(_) => "equation",
            Block::Image(_) => "image",
        }
    }

    /// Paragraph holding a single plain-text fragment.
    ///
    /// Text longer than [`TEXT_CHUNK_LIMIT`] is split across fragments.
    pub fn text(content: &str) -> Self {
        Block::Paragraph(
            crate::pipeline::inline::split_text(content)
                .into_iter()
                .map(TextFragment::Text)
                .collect(),
        )
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("object", "block")?;
        map.serialize_entry("type", self.kind())?;
        match self {
            Block::Paragraph(fragments) => {
                map.serialize_entry("paragraph", &json!({ "rich_text": fragments }))?;
            }
            Block::Equation(expression) => {
                map.serialize_entry("equation", &json!({ "expression": expression }))?;
            }
            Block::Image(url) => {
                map.serialize_entry(
                    "image",
                    &json!({ "type": "external", "external": { "url": url } }),
                )?;
            }
        }
        map.end()
    }
}
