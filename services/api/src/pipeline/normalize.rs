//! services/api/src/pipeline/normalize.rs
//!
//! Deterministic cleanup of model-generated HTML fragments.
//!
//! The prompt instructs the model to emit only the fragment, but models
//! occasionally wrap the output in a markdown code fence anyway. One cheap
//! rule strips it; no other validation is performed on the fragment.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_LEADING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*```html\r?\n").unwrap());
static RE_TRAILING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n```\s*$").unwrap());

/// Strips one leading ```` ```html ```` fence and one trailing ```` ``` ````
/// fence, if present. Idempotent: applying it to already-clean input is a
/// no-op.
pub fn strip_html_fences(input: &str) -> String {
    let s = RE_LEADING_FENCE.replace(input, "");
    let s = RE_TRAILING_FENCE.replace(&s, "");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"<div id="limits" class="lecture-content" data-unit="unit1"><h1>Limits</h1></div>"#;

    #[test]
    fn strips_both_fences() {
        let fenced = format!("```html\n{}\n```", CLEAN);
        assert_eq!(strip_html_fences(&fenced), CLEAN);
    }

    #[test]
    fn clean_input_is_untouched() {
        assert_eq!(strip_html_fences(CLEAN), CLEAN);
    }

    #[test]
    fn idempotent_on_repeated_application() {
        let fenced = format!("```html\n{}\n```", CLEAN);
        let once = strip_html_fences(&fenced);
        assert_eq!(strip_html_fences(&once), once);
    }

    #[test]
    fn interior_fences_are_preserved() {
        let body = "<div><pre>```html\ncode sample\n```</pre>\nmore</div>";
        assert_eq!(strip_html_fences(body), body);
    }

    #[test]
    fn crlf_fences_are_stripped() {
        let fenced = format!("```html\r\n{}\r\n```", CLEAN);
        assert_eq!(strip_html_fences(&fenced), CLEAN);
    }
}
