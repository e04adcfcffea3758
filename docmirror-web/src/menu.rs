use crate::error::MirrorError;
use crate::fetch::PageFetcher;
use crate::html::strip_control_chars;
use docmirror_common::LinkItem;
use regex::Regex;
use std::sync::LazyLock;

static MENU_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a class="menu__link[^"]*?" [^>]*?tabindex="0" href="(.*?)">(.*?)</a>"#)
        .expect("menu link pattern")
});

/// Extract sidebar menu links in document order.
///
/// Only focusable menu anchors (`tabindex="0"`) count; category toggles and
/// collapsed entries are skipped by the pattern.
///
/// ```
/// use docmirror_web::parse_menu;
///
/// let html = r#"<a class="menu__link" tabindex="0" href="/docs/intro">Intro</a>"#;
/// let links = parse_menu(html);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].url, "/docs/intro");
/// ```
pub fn parse_menu(html: &str) -> Vec<LinkItem> {
    MENU_LINK
        .captures_iter(html)
        .map(|caps| LinkItem {
            url: caps[1].to_string(),
            title: strip_control_chars(&caps[2]),
        })
        .collect()
}

/// Fetch the site root and list its menu links.
///
/// Failure here is fatal for a run: there is nothing to iterate.
pub async fn list_links<F: PageFetcher + ?Sized>(fetcher: &F) -> Result<Vec<LinkItem>, MirrorError> {
    let html = fetcher
        .fetch_page("")
        .await
        .map_err(|source| MirrorError::ListFetch {
            url: fetcher.page_url(""),
            source,
        })?;
    let links = parse_menu(&html);
    tracing::info!(target: "mirror.menu", count = links.len(), "links.found");
    Ok(links)
}
