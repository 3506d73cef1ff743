//! Math conversion: Markdown math source → KaTeX-compatible LaTeX.
//!
//! ```text
//! expr ─┬─ contains \begin{array} ──────────────▶ normalize
//!       └─ translate("$expr$") ─┬─ Ok(latex) ───▶ strip delimiters → normalize → division
//!                               └─ Err(_) ──────▶ normalize(expr) → division
//! ```
//!
//! The translator result is matched as a `Result`: the `Err` arm *is* the
//! fallback, so conversion never fails and never surfaces a translator error.

use crate::block::MathExpression;
use crate::pipeline::normalize::{convert_division, normalize, ARRAY_MARKER};
use crate::translate::MathTranslator;
use tracing::{debug, warn};

/// Convert one math expression to the renderer dialect.
///
/// Always returns a string. Array environments are only normalised because
/// the translator mangles them.
pub async fn convert_math(expr: &str, translator: &dyn MathTranslator) -> MathExpression {
    if expr.contains(ARRAY_MARKER) {
        debug!("array environment, normalise only");
        return normalize(expr);
    }

    let wrapped = format!("${expr}$");
    match translator.translate(&wrapped).await {
        Ok(latex) => convert_division(&normalize(strip_math_delimiters(&latex))),
        Err(e) => {
            warn!("math translation failed, using heuristic fallback: {}", e);
            convert_division(&normalize(expr))
        }
    }
}

/// Trim the translator output and remove one enclosing `\(…\)` or `$…$` pair.
pub fn strip_math_delimiters(latex: &str) -> &str {
    let s = latex.trim();
    if s.len() >= 4 && s.starts_with(r"\(") && s.ends_with(r"\)") {
        s[2..s.len() - 2].trim()
    } else if s.len() >= 2 && s.starts_with('$') && s.ends_with('$') {
        s[1..s.len() - 1].trim()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed translation and counts calls.
    struct Fixed {
        output: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MathTranslator for Fixed {
        async fn translate(&self, _markdown: &str) -> Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl MathTranslator for Broken {
        async fn translate(&self, _markdown: &str) -> Result<String, TranslationError> {
            Err(TranslationError::Unavailable("pandoc not found".into()))
        }
    }

    /// Echoes its input, like a translator that leaves `$…$` untouched.
    struct Echo;

    #[async_trait]
    impl MathTranslator for Echo {
        async fn translate(&self, markdown: &str) -> Result<String, TranslationError> {
            Ok(format!("{markdown}\n"))
        }
    }

    #[test]
    fn strip_paren_delimiters() {
        assert_eq!(strip_math_delimiters("\\( x + 1 \\)\n"), "x + 1");
    }

    #[test]
    fn strip_dollar_delimiters() {
        assert_eq!(strip_math_delimiters("$x$"), "x");
    }

    #[test]
    fn strip_leaves_bare_latex() {
        assert_eq!(strip_math_delimiters(r"  \alpha "), r"\alpha");
        assert_eq!(strip_math_delimiters("$"), "$");
    }

    #[tokio::test]
    async fn array_skips_translator() {
        let t = Fixed {
            output: "unused",
            calls: AtomicUsize::new(0),
        };
        let out = convert_math(r"\begin{array}{c} a|b \end{array}", &t).await;
        assert_eq!(out, r"\begin{array}{c} a\mid b \end{array}");
        assert_eq!(t.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn translated_output_is_normalised_and_divided() {
        let t = Fixed {
            output: r"\(y = a|b\)",
            calls: AtomicUsize::new(0),
        };
        assert_eq!(convert_math("y = a|b", &t).await, r"y = \frac{a}{b}");
        assert_eq!(t.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_translator_output_still_converts() {
        let cases = [
            ("", ""),
            ("$", "$"),
            ("$$", ""),
            (r"\(", r"\("),
            (r"\)", r"\)"),
            (r"\(\)", ""),
            ("\\(é\\)", "é"),
            ("  $ a|b $\n", r"a\mid b"),
        ];
        for (output, expected) in cases {
            let t = Fixed {
                output,
                calls: AtomicUsize::new(0),
            };
            assert_eq!(convert_math("x", &t).await, expected, "output {output:?}");
        }
    }

    #[tokio::test]
    async fn echo_translator_round_trips_dollars() {
        assert_eq!(convert_math("x+1", &Echo).await, "x+1");
    }

    #[tokio::test]
    async fn failure_falls_back_to_original_expression() {
        let out = convert_math(r"A = B \mid C", &Broken).await;
        assert_eq!(out, r"A = \frac{B}{C}");
    }

    #[test]
    fn sync_driver_never_panics_on_failure() {
        let out = tokio_test::block_on(convert_math("a|b", &Broken));
        assert_eq!(out, r"a\mid b");
    }
}
