//! Article extraction: content block, summary, link rewriting, wrapping.
//!
//! Everything here is pure string work over one fetched page; the I/O lives
//! in [`crate::pipeline`].

use crate::error::MirrorError;
use crate::html::strip_tags;
use crate::key::filename_key;
use docmirror_common::LinkItem;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CONTENT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div class="theme-doc-markdown markdown">([\s\S]*?)</article>"#)
        .expect("content block pattern")
});

static COPY_BUTTONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div class="buttonGroup__atx">.*?</div>"#).expect("copy button pattern")
});

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>\n]+?href="([^"\n]+?)""#).expect("anchor href pattern")
});

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("absolute url pattern"));

static CODE_LANG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<pre><code class="lang-[^"]*?">"#).expect("code language pattern")
});

/// Headings whose section becomes the article summary ("Overview", "Introduction").
const SUMMARY_HEADINGS: [&str; 2] = ["概述", "介绍"];

// One pattern per heading word: the id, text, link target and labels must all agree.
static SUMMARY_SECTIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SUMMARY_HEADINGS
        .iter()
        .map(|word| {
            let w = regex::escape(word);
            Regex::new(&format!(
                r##"<h2 class="anchor[^"]*?" id="{w}">{w}<a href="#{w}" class="hash-link" aria-label="{w}的直接链接" title="{w}的直接链接">.*?</a></h2>([\s\S]*?)<h2"##
            ))
            .expect("summary pattern")
        })
        .collect()
});

/// Knobs for the generated standalone document.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// `lang` attribute of the generated `<html>` element.
    pub lang: String,
    /// Stylesheet href, relative to the article file.
    pub stylesheet: String,
    /// Language tag every code block is normalised to.
    pub code_language: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            lang: "zh_CN".into(),
            stylesheet: "../doc.css".into(),
            code_language: "js".into(),
        }
    }
}

/// A page reduced to what the mirror writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    /// File stem of the output: key of the lower-cased source URL.
    pub key: String,
    /// Complete standalone HTML document.
    pub document: String,
    pub summary: String,
    /// Keys of the internal pages this article now links to, first-seen order.
    pub link_keys: Vec<String>,
}

/// Turn one fetched article page into its mirrored document.
///
/// Fails with [`MirrorError::ContentNotFound`] when the page has no
/// markdown content block.
pub fn extract_article(
    item: &LinkItem,
    page_html: &str,
    opts: &ExtractOptions,
) -> Result<ExtractedArticle, MirrorError> {
    let block = content_block(page_html).ok_or_else(|| MirrorError::ContentNotFound {
        url: item.url.clone(),
    })?;
    let summary = doc_summary(block);

    let mut document = wrap_document(block, opts);
    document = remove_copy_buttons(&document);
    let (rewritten, link_keys) = rewrite_links(&document);
    document = normalize_code_blocks(&rewritten, &opts.code_language);

    // Outbound names use the lower-cased URL while inbound links keep the
    // original case; the two only agree for lower-case site paths.
    let key = filename_key(&item.url.to_lowercase());

    Ok(ExtractedArticle {
        key,
        document,
        summary,
        link_keys,
    })
}

/// The rendered markdown between the content marker and `</article>`.
pub fn content_block(page_html: &str) -> Option<&str> {
    CONTENT_BLOCK
        .captures(page_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Plain text of the first "概述"/"介绍" section, or an empty string.
///
/// The section runs from its heading to the next `<h2`.
pub fn doc_summary(block: &str) -> String {
    SUMMARY_SECTIONS
        .iter()
        .filter_map(|re| re.captures(block))
        .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?.as_str())))
        .min_by_key(|(start, _)| *start)
        .map(|(_, section)| strip_tags(section))
        .unwrap_or_default()
}

fn wrap_document(body: &str, opts: &ExtractOptions) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="{lang}"><head><meta charset="UTF-8"><title></title><link rel="stylesheet" href="{css}" /></head> <body>{body}</body></html>"#,
        lang = opts.lang,
        css = opts.stylesheet,
    )
}

/// Drop the rendered "copy code" button groups.
pub fn remove_copy_buttons(html: &str) -> String {
    COPY_BUTTONS.replace_all(html, "").into_owned()
}

/// Point internal anchors at their mirrored files.
///
/// Each distinct `href` value is handled once: absolute `http(s)` URLs and
/// pure `#fragment` links stay as they are; anything else becomes
/// `<key>.html#fragment`, where the key hashes the path part as written.
/// Replacement is literal on `href="<value>"`, so it also touches identical
/// attributes outside anchors. Returns the new HTML and the keys linked to.
pub fn rewrite_links(html: &str) -> (String, Vec<String>) {
    let mut seen = HashSet::new();
    let hrefs: Vec<String> = ANCHOR_HREF
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .filter(|href| seen.insert(href.clone()))
        .collect();

    let mut out = html.to_string();
    let mut keys = Vec::new();
    for original in hrefs {
        let target = original.trim();
        if ABSOLUTE_URL.is_match(target) {
            continue;
        }
        let (path, fragment) = match target.find('#') {
            Some(idx) => target.split_at(idx),
            None => (target, ""),
        };
        if path.is_empty() {
            continue;
        }

        let key = filename_key(path);
        out = out.replace(
            &format!(r#"href="{original}""#),
            &format!(r#"href="{key}.html{fragment}""#),
        );
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    (out, keys)
}

/// Force every `<pre><code class="lang-…">` to one language.
pub fn normalize_code_blocks(html: &str, language: &str) -> String {
    let replacement = format!(r#"<pre><code class="lang-{language}">"#);
    CODE_LANG
        .replace_all(html, regex::NoExpand(&replacement))
        .into_owned()
}
