//! Fence normalization and the ordered extraction strategy chain.
//!
//! Model responses rarely arrive as clean JSON: they come wrapped in markdown
//! fences, surrounded by prose, or with the object syntax itself broken. The
//! chain below runs a fixed sequence of progressively more tolerant
//! strategies over the normalized text; the first one to produce a candidate
//! wins and later strategies are not attempted. Every strategy returns an
//! `Option` — failure is a non-match, never an error.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

/// Which strategy produced a candidate. Lets the orchestrator distinguish a
/// clean response from one that needed repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The whole normalized text parsed as one JSON document.
    Direct,
    /// A balanced-brace slice embedded in surrounding prose parsed.
    BalancedScan,
    /// Individual fields were recovered by pattern matching.
    FieldRecovery,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::BalancedScan => write!(f, "balanced_scan"),
            Self::FieldRecovery => write!(f, "field_recovery"),
        }
    }
}

/// Strip markdown code fences and surrounding whitespace.
///
/// Absence of a fence marker is a no-op, not an error, and normalizing
/// already-normalized text yields the identical text.
pub fn normalize(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

/// Run the strategy chain over normalized text, first success wins.
pub fn extract_candidate(text: &str) -> Option<(Value, Strategy)> {
    if let Some(value) = direct_parse(text) {
        return Some((value, Strategy::Direct));
    }
    if let Some(value) = balanced_scan(text) {
        return Some((value, Strategy::BalancedScan));
    }
    if let Some(value) = recover_fields(text) {
        return Some((value, Strategy::FieldRecovery));
    }
    None
}

/// Strategy 1: the entire text is one well-formed JSON document.
fn direct_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Strategy 2: locate an object embedded in prose by brace depth counting.
///
/// Depth is tracked over every `{`/`}` byte, so balanced braces inside a
/// field's own value (a CSS rule, say) do not terminate the scan early. If no
/// opening brace exists, or depth never returns to zero, the strategy fails.
fn balanced_scan(text: &str) -> Option<Value> {
    let mut depth: i64 = 0;
    let mut start: Option<usize> = None;
    let mut end: Option<usize> = None;

    for (i, byte) in text.bytes().enumerate() {
        match byte {
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 && start.is_some() {
                    end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    let (start, end) = (start?, end?);
    serde_json::from_str(&text[start..=end]).ok()
}

/// Strategy 3: recover `html`/`css`/`js` individually with a tolerant
/// pattern, even when the surrounding object syntax is broken.
///
/// `html` and `css` are required; `js` defaults to the empty string.
fn recover_fields(text: &str) -> Option<Value> {
    let html = find_field(text, 0)?;
    let css = find_field(text, 1)?;
    let js = find_field(text, 2).unwrap_or_default();
    Some(json!({ "html": html, "css": css, "js": js }))
}

fn find_field(text: &str, index: usize) -> Option<String> {
    let captures = field_patterns()[index].captures(text)?;
    Some(unescape(captures.get(1)?.as_str()))
}

fn field_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Quoted key, colon, double-quoted value that may contain escaped
        // characters spanning multiple lines.
        let build = |key: &str| {
            Regex::new(&format!(r#"(?s)"{key}"\s*:\s*"((?:[^"\\]|\\.)*)""#))
                .expect("field pattern is a valid regex")
        };
        [build("html"), build("css"), build("js")]
    })
}

/// Unescape `\n`, then `\"`, then `\\`, in that order.
fn unescape(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}
