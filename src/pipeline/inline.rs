//! Inline content splitting: paragraph text → ordered rich-text fragments.
//!
//! Inline math is a span delimited by a *single* `$` on each side. A `$` that
//! touches another `$` is never a delimiter, which keeps `$$…$$` display math
//! out of inline matching. Spans do not cross line breaks.
//!
//! The `regex` crate has no look-around, so the delimiter rules are applied by
//! a small byte scanner ([`find_inline_math`]). `$` and `\n` are ASCII, so
//! byte offsets are always valid `char` boundaries.

use crate::block::{TextFragment, TEXT_CHUNK_LIMIT};
use crate::pipeline::math::convert_math;
use crate::translate::MathTranslator;
use std::ops::Range;

/// Split `text` into text and inline-equation fragments in reading order.
///
/// Plain text is chunked with [`split_text`]; each math span is trimmed and
/// passed through [`convert_math`].
pub async fn split_inline(text: &str, translator: &dyn MathTranslator) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    let mut last_end = 0;

    for span in find_inline_math(text) {
        push_text(&mut fragments, &text[last_end..span.outer.start]);
        let expr = convert_math(text[span.inner].trim(), translator).await;
        fragments.push(TextFragment::Equation(expr));
        last_end = span.outer.end;
    }
    push_text(&mut fragments, &text[last_end..]);

    fragments
}

/// Split text into consecutive pieces of at most [`TEXT_CHUNK_LIMIT`] characters.
///
/// Boundaries fall at fixed character counts; words may be cut.
pub fn split_text(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for c in text.chars() {
        if count == TEXT_CHUNK_LIMIT {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(c);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn push_text(fragments: &mut Vec<TextFragment>, text: &str) {
    fragments.extend(split_text(text).into_iter().map(TextFragment::Text));
}

/// Byte ranges of one inline math match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    /// Including both `$` delimiters.
    pub outer: Range<usize>,
    /// Content between the delimiters.
    pub inner: Range<usize>,
}

/// Locate inline math spans, scanning left to right without overlap.
///
/// A delimiter is a `$` whose neighbours are not `$`. The content is
/// non-empty, has no line break, and is as short as possible.
pub fn find_inline_math(text: &str) -> Vec<InlineSpan> {
    let bytes = text.as_bytes();
    let is_delim = |i: usize| {
        bytes[i] == b'$'
            && (i == 0 || bytes[i - 1] != b'$')
            && bytes.get(i + 1) != Some(&b'$')
    };

    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !is_delim(i) {
            i += 1;
            continue;
        }
        // Content needs at least one byte before the closing delimiter.
        let mut j = i + 2;
        let mut close = None;
        if bytes.get(i + 1).is_some_and(|&b| b != b'\n') {
            while j < bytes.len() && bytes[j] != b'\n' {
                if is_delim(j) {
                    close = Some(j);
                    break;
                }
                j += 1;
            }
        }
        match close {
            Some(j) => {
                spans.push(InlineSpan {
                    outer: i..j + 1,
                    inner: i + 1..j,
                });
                i = j + 1;
            }
            None => i += 1,
        }
    }
    spans
}
