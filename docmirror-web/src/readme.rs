//! README regeneration from the article index.
//!
//! The listing lives between two HTML comment markers so hand-written README
//! text around it survives regeneration.

use crate::error::MirrorError;
use docmirror_common::ArticleInfo;
use std::path::Path;
use tokio::fs;

pub const START_MARKER: &str = "<!-- docmirror:start -->";
pub const END_MARKER: &str = "<!-- docmirror:end -->";

const DEFAULT_HEADER: &str = "# Documentation mirror\n\nOffline copy of the documentation site.\n\n";

/// Markdown listing of all articles, one bullet each, in index order.
///
/// ```
/// use docmirror_common::ArticleInfo;
/// use docmirror_web::readme::render_listing;
///
/// let md = render_listing(&[ArticleInfo::new("Intro", "docs/a.html", "Hello")], "dist/");
/// assert!(md.contains("- [Intro](dist/docs/a.html): Hello\n"));
/// ```
pub fn render_listing(articles: &[ArticleInfo], link_prefix: &str) -> String {
    let mut out = format!("Articles: {}\n\n", articles.len());
    for article in articles {
        out.push_str(&format!(
            "- [{}]({}{})",
            escape_link_text(&article.title),
            link_prefix,
            article.path
        ));
        let summary = one_line(&article.summary);
        if !summary.is_empty() {
            out.push_str(": ");
            out.push_str(&summary);
        }
        out.push('\n');
    }
    out
}

/// Replace the marked listing in `path`.
///
/// A README without markers keeps its text and gets the marked block
/// appended; a missing README is created with a default header.
pub async fn update_readme(
    path: &Path,
    articles: &[ArticleInfo],
    link_prefix: &str,
) -> Result<(), MirrorError> {
    let block = format!(
        "{START_MARKER}\n{}{END_MARKER}",
        render_listing(articles, link_prefix)
    );

    let existing = match fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(MirrorError::io(path, e)),
    };

    let content = match existing {
        Some(text) => splice(&text, &block).unwrap_or_else(|| {
            tracing::info!(
                target: "mirror.readme",
                path = %path.display(),
                "readme.markers_appended"
            );
            append_block(&text, &block)
        }),
        None => format!("{DEFAULT_HEADER}{block}\n"),
    };

    fs::write(path, content)
        .await
        .map_err(|e| MirrorError::io(path, e))?;
    tracing::debug!(target: "mirror.readme", path = %path.display(), entries = articles.len(), "readme.written");
    Ok(())
}

fn splice(text: &str, block: &str) -> Option<String> {
    let start = text.find(START_MARKER)?;
    let end = start + text[start..].find(END_MARKER)? + END_MARKER.len();
    Some(format!("{}{}{}", &text[..start], block, &text[end..]))
}

fn append_block(text: &str, block: &str) -> String {
    let body = text.trim_end_matches('\n');
    if body.is_empty() {
        format!("{block}\n")
    } else {
        format!("{body}\n\n{block}\n")
    }
}

fn escape_link_text(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
