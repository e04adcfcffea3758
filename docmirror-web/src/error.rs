use docmirror_http::HttpError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of a mirror run.
///
/// `ListFetch` is fatal. `ArticleFetch` and `ContentNotFound` only skip the
/// affected article.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("failed to fetch link list from {url}: {source}")]
    ListFetch {
        url: String,
        #[source]
        source: HttpError,
    },
    #[error("failed to fetch article {url}: {source}")]
    ArticleFetch {
        url: String,
        #[source]
        source: HttpError,
    },
    #[error("article content not found in {url}")]
    ContentNotFound { url: String },
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("index serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl MirrorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MirrorError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the run should stop instead of skipping one article.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MirrorError::ListFetch { .. })
    }
}
