//! Common types and utilities shared across docmirror crates.
//!
//! This crate defines the data model that flows between the link lister,
//! the article extractor and the index writers, plus the observability
//! helpers every binary and integration test uses. It is intentionally
//! lightweight so that all crates can depend on it.
//!
//! # Overview
//!
//! - [`LinkItem`]: one entry of the site's navigation menu
//! - [`ArticleInfo`]: one successfully mirrored article, as persisted in the index
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use docmirror_common::ArticleInfo;
//!
//! let info = ArticleInfo::new("Intro", "docs/abc.html", "Hello");
//! let json = serde_json::to_string(&info).unwrap();
//! assert_eq!(json, r#"{"t":"Intro","p":"docs/abc.html","d":"Hello"}"#);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// A navigation menu entry scraped from the site root.
///
/// `url` is relative to the site root (e.g. `/docs/about-getting-started`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub title: String,
    pub url: String,
}

impl LinkItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Index record for one mirrored article.
///
/// The short field names are the on-disk contract of `indexes.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInfo {
    /// Article title, taken from the menu link text.
    #[serde(rename = "t")]
    pub title: String,
    /// Output path relative to the output root, e.g. `docs/<key>.html`.
    #[serde(rename = "p")]
    pub path: String,
    /// Plain-text summary; empty when the article has no overview section.
    #[serde(rename = "d")]
    pub summary: String,
}

impl ArticleInfo {
    pub fn new(
        title: impl Into<String>,
        path: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            summary: summary.into(),
        }
    }
}
