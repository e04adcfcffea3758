use async_trait::async_trait;
use docmirror_http::{HttpClient, HttpError, RequestOpts};

/// Source of page HTML, addressed by paths relative to the site root.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, path: &str) -> Result<String, HttpError>;

    /// Absolute URL for `path`, used in logs and errors.
    fn page_url(&self, path: &str) -> String;
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, path: &str) -> Result<String, HttpError> {
        self.get_text(path, RequestOpts::default()).await
    }

    fn page_url(&self, path: &str) -> String {
        self.resolve(path, false)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.base(), path))
    }
}
