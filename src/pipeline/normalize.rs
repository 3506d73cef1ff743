//! Math normalisation: make LaTeX emitted by the translator KaTeX-friendly.
//!
//! The translator (pandoc) and Notion's KaTeX renderer disagree on a handful
//! of tokens. Each mismatch is fixed by one pure `&str → String` rule, and the
//! rules run in the fixed order of [`RULES`].
//!
//! ## Rule Order
//!
//! The bar rule must run last: it emits `\mid ` markers, and the earlier rules
//! (in particular the `\mid`-spacing rule) would otherwise see its output on
//! the same pass.
//!
//! [`convert_division`] is not part of the rule list. It rewrites the
//! shorthand `lhs = num \mid den` into `lhs = \frac{num}{den}` and is applied
//! by the converter only on the translation and fallback paths, never to
//! array environments.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker that switches the converter into normalise-only mode.
pub const ARRAY_MARKER: &str = r"\begin{array}";

/// Escaped divider emitted for raw `|` and used as the division operator.
pub const DIVIDER: &str = r"\mid";

/// A named, pure text rewrite.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// The normaliser rules in application order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "times-marker",
        apply: rewrite_times_marker,
    },
    Rule {
        name: "dotted-comma",
        apply: rewrite_dotted_comma,
    },
    Rule {
        name: "spaced-times",
        apply: rewrite_spaced_times,
    },
    Rule {
        name: "divider-spacing",
        apply: space_divider_before_letter,
    },
    // Must stay last; see module docs.
    Rule {
        name: "raw-bar",
        apply: escape_raw_bars,
    },
];

/// Apply every rule of [`RULES`] in order.
pub fn normalize(expr: &str) -> String {
    RULES
        .iter()
        .fold(expr.to_string(), |acc, rule| (rule.apply)(&acc))
}

/// Rewrite `lhs = num \mid den` into `lhs = \frac{num}{den}`.
///
/// Splits at the first `=` and uses the *last* `\mid` of the right-hand side
/// as the division point, so `a \mid b \mid c` becomes
/// `\frac{a \mid b}{c}`. Expressions without `=` or without a divider on the
/// right-hand side are returned unchanged.
pub fn convert_division(expr: &str) -> String {
    let Some((lhs, rhs)) = expr.split_once('=') else {
        return expr.to_string();
    };
    let Some(idx) = rhs.rfind(DIVIDER) else {
        return expr.to_string();
    };
    let numerator = rhs[..idx].trim();
    let denominator = rhs[idx + DIVIDER.len()..].trim();
    format!(
        r"{} = \frac{{{}}}{{{}}}",
        lhs.trim(),
        numerator,
        denominator
    )
}

// ── Rule 1: Multiplication markers ──────────────────────────────────────────

/// `\mathrm{\x}` and the shorthand `\x` both mean `\times`.
///
/// `\x` followed by a letter is a different command (`\xi`, `\xrightarrow`)
/// and is left alone.
fn rewrite_times_marker(input: &str) -> String {
    let s = input.replace(r"\mathrm{\x}", r"\times");
    let mut out = String::with_capacity(s.len() + 8);
    let mut rest = s.as_str();
    while let Some(pos) = rest.find(r"\x") {
        let after = &rest[pos + 2..];
        out.push_str(&rest[..pos]);
        if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.push_str(r"\x");
        } else {
            out.push_str(r"\times");
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

// ── Rule 2: Dotted comma ────────────────────────────────────────────────────

fn rewrite_dotted_comma(input: &str) -> String {
    input.replace(r"\dot{,}", ",")
}

// ── Rule 3: Spaced times ────────────────────────────────────────────────────

fn rewrite_spaced_times(input: &str) -> String {
    input.replace(r"\;x\;", r"\times ")
}

// ── Rule 4: Divider spacing ─────────────────────────────────────────────────

static RE_DIVIDER_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\\mid)([A-Za-z])").unwrap());

fn space_divider_before_letter(input: &str) -> String {
    RE_DIVIDER_LETTER
        .replace_all(input, "${1} ${2}")
        .into_owned()
}

// ── Rule 5: Raw bars ────────────────────────────────────────────────────────

/// Every `|` not preceded by a backslash becomes `\mid `.
fn escape_raw_bars(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if c == '|' && prev != Some('\\') {
            out.push_str(r"\mid ");
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}
