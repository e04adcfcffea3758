//! Site mirroring: menu discovery, article extraction and persistence.
//!
//! - Page fetching seam (`fetch`) implemented by `docmirror_http::HttpClient`
//! - Regex-based HTML helpers (`html`) and content-addressed names (`key`)
//! - Menu link lister (`menu`) and article extractor (`article`)
//! - Index and README writers (`index`, `readme`)
//! - The sequential orchestrator (`pipeline`)
//!
//! Extraction is deliberately pattern based: it targets the markup of one
//! Docusaurus-style site and is not a general HTML parser.

pub mod article;
pub mod error;
pub mod fetch;
pub mod html;
pub mod index;
pub mod key;
pub mod menu;
pub mod pipeline;
pub mod readme;

pub use article::{ExtractOptions, ExtractedArticle, extract_article};
pub use error::MirrorError;
pub use fetch::PageFetcher;
pub use key::filename_key;
pub use menu::{list_links, parse_menu};
pub use pipeline::{ArticleFailure, Mirror, MirrorOptions, MirrorReport};
