//! Pipeline stages for Markdown-to-Notion conversion.
//!
//! Each submodule implements exactly one transformation step. The math and
//! text stages are pure apart from the injected translator; only
//! [`segment`] (image hosting) and [`publish`] (Notion) reach the network,
//! and both do so through capability traits.
//!
//! ## Data Flow
//!
//! ```text
//! markdown ──▶ segment ──┬──▶ inline ──▶ math ──▶ normalize
//!                        └──▶ image host
//!          blocks ──▶ publish (create + append, ≤100 blocks each)
//! ```
//!
//! 1. [`normalize`]: ordered KaTeX fix-up rules and `\mid` → `\frac` division
//! 2. [`math`]: translator call with heuristic fallback
//! 3. [`inline`]: `$…$` spans and 2000-character text chunks
//! 4. [`segment`]: blank-line segments, display math, images, paragraphs
//! 5. [`publish`]: chunked page creation

pub mod inline;
pub mod math;
pub mod normalize;
pub mod publish;
pub mod segment;
