//! Small text helpers over raw HTML strings.
//!
//! These are heuristics for well-formed, machine-generated markup: tags are
//! removed with a pattern, and only the handful of entities the site emits
//! are decoded.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

/// Remove all markup and return trimmed plain text.
///
/// ```
/// use docmirror_web::html::strip_tags;
///
/// assert_eq!(strip_tags("<p>Hello <code>jsdoc</code></p>\n"), "Hello jsdoc");
/// ```
pub fn strip_tags(html: &str) -> String {
    let text = TAG.replace_all(html, "");
    decode_entities(&text).trim().to_string()
}

/// Remove C0 (U+0000–U+001F) and C1 (U+007F–U+009F) control characters.
///
/// Everything else, including whitespace that is not a control character,
/// is kept byte for byte.
pub fn strip_control_chars(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    // &amp; last so "&amp;lt;" stays "&lt;".
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_nested_tags_and_attributes() {
        let html = r#"<p>使用 <a href="/docs/x" class="y">JSDoc</a> 注释</p>"#;
        assert_eq!(strip_tags(html), "使用 JSDoc 注释");
    }

    #[test]
    fn keeps_line_structure_between_blocks() {
        assert_eq!(strip_tags("<p>one</p>\n<p>two</p>"), "one\ntwo");
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(
            strip_tags("<code>a &lt; b &amp;&amp; c</code>"),
            "a < b && c"
        );
        assert_eq!(strip_tags("&amp;lt;"), "&lt;");
    }

    #[test]
    fn removes_c0_and_c1_controls_only() {
        let title = "In\u{0}tro\u{1f}\u{7f}duc\u{85}tion\u{9f} 概述\u{a0}";
        assert_eq!(strip_control_chars(title), "Introduction 概述\u{a0}");
        assert_eq!(strip_control_chars("a\tb\nc"), "abc");
    }

    #[test]
    fn plain_titles_are_unchanged() {
        let title = "Getting Started: @use JSDoc";
        assert_eq!(strip_control_chars(title), title);
    }
}
