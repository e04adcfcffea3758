//! Minimal HTTP client for fetching pages as text, with safe logging.
//!
//! - Request options: headers, timeout, retries, absolute URLs
//! - Every failure is terminal by default; retries of 429/5xx/transport
//!   errors (exponential backoff, `Retry-After`) are opt-in
//! - Optional *raw* request/response logging via `DOCMIRROR_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), docmirror_http::HttpError> {
//! let client = docmirror_http::HttpClient::new("https://www.jsdoc.com.cn")?;
//! let html = client
//!     .get_text("/docs/about-getting-started", docmirror_http::RequestOpts::default())
//!     .await?;
//! # let _ = html;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), retries and final errors,
//! plus raw request/response lines (target `http.raw`) when enabled.

use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "DOCMIRROR_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const DEFAULT_USER_AGENT: &str = concat!("docmirror/", env!("CARGO_PKG_VERSION"));

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug.
fn make_curl(url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string()];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization")
                || key.eq_ignore_ascii_case("cookie")
                || key.eq_ignore_ascii_case("set-cookie")
            {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },
    #[error("{url} returned {status}: {snippet}")]
    Status {
        url: String,
        status: StatusCode,
        snippet: String,
    },
}

impl HttpError {
    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use docmirror_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(1),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.allow_absolute == false);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub headers: Option<HeaderMap>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    user_agent: HeaderValue,
    pub default_timeout: Option<Duration>,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use docmirror_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://www.jsdoc.com.cn")?;
    /// assert_eq!(client.default_timeout, None);
    /// assert_eq!(client.max_retries, 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
            default_timeout: None,
            max_retries: 0,
        })
    }

    /// Set (or clear) the per-request timeout.
    ///
    /// ```no_run
    /// use docmirror_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://www.jsdoc.com.cn")?
    ///     .with_timeout(Some(Duration::from_secs(2)));
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(2)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Option<Duration>) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the retry budget (zero by default).
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_user_agent(mut self, ua: &str) -> Result<Self, HttpError> {
        self.user_agent = HeaderValue::from_str(ua)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent: {e}")))?;
        Ok(self)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base URL, honouring `allow_absolute`.
    pub fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// GET `path` and return the body as text. Only 2xx responses succeed.
    pub async fn get_text(&self, path: &str, opts: RequestOpts) -> Result<String, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;

        let mut attempt = 0usize;
        let max_retries = opts.retries.unwrap_or(self.max_retries);

        loop {
            // ----- Build request -----
            let mut rb = self.inner.get(url.clone());

            let timeout = opts.timeout.or(self.default_timeout);
            if let Some(timeout) = timeout {
                rb = rb.timeout(timeout);
            }

            let mut headers = HeaderMap::new();
            headers.insert(USER_AGENT, self.user_agent.clone());
            if let Some(extra) = &opts.headers {
                for (k, v) in extra.iter() {
                    headers.insert(k, v.clone());
                }
            }
            rb = rb.headers(headers.clone());

            let req_id = format!(
                "r{:x}",
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos()
            );

            tracing::debug!(
                req_id=%req_id,
                attempt=attempt + 1,
                max_retries,
                host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                timeout_ms=?timeout.map(|t| t.as_millis() as u64),
                "http.request.start"
            );

            if raw_enabled() {
                let curl = make_curl(&url, &headers);
                tracing::debug!(target: "http.raw", %req_id, %curl, "request");
            }

            // ----- Send -----
            let t0 = std::time::Instant::now();
            let sent = match rb.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    resp.bytes().await.map(|bytes| (status, headers, bytes))
                }
                Err(err) => Err(err),
            };
            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    tracing::warn!(
                        req_id=%req_id,
                        attempt,
                        max_retries,
                        url=%url,
                        message=%message,
                        "http.network_error"
                    );
                    return Err(HttpError::Network {
                        url: url.to_string(),
                        message,
                    });
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms=dur_ms,
                body_len=bytes.len(),
                content_type=?headers.get(reqwest::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
                "http.response.headers"
            );

            if raw_enabled() {
                let hdrs = redact_headers(&headers);
                let truncated = bytes.len() > RAW_MAX_BODY;
                let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
                tracing::info!(
                    target:"http.raw",
                    %req_id,
                    status=%status,
                    duration_ms=dur_ms,
                    headers=?hdrs,
                    body=%text,
                    truncated
                );
            }

            let snippet = snip_body(&bytes);
            tracing::trace!(
                req_id=%req_id,
                body_snippet=%snippet,
                "http.response.body_snippet"
            );

            // ----- Success path -----
            if status.is_success() {
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }

            // ----- Non-success: maybe retry -----
            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;
            let is_5xx = status.is_server_error();

            if (is_429 || is_5xx) && attempt < max_retries {
                attempt += 1;
                let delay = match retry_after_delay_secs(&headers) {
                    Some(secs) => Duration::from_secs(secs),
                    None if is_429 => backoff(attempt).max(Duration::from_millis(1100)),
                    None => backoff(attempt),
                };
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    body_snippet=%snippet,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                url=%url,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Status {
                url: url.to_string(),
                status,
                snippet,
            });
        }
    }
}

// ==============================
// Helpers
// ==============================

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt - 1).min(16)))
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snip_respects_char_boundaries() {
        let body = "概".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= 503);
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(400));
        assert_eq!(backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn resolve_joins_relative_paths() {
        let client = HttpClient::new("https://www.jsdoc.com.cn").unwrap();
        assert_eq!(
            client.resolve("/docs/intro", false).unwrap().as_str(),
            "https://www.jsdoc.com.cn/docs/intro"
        );
        assert_eq!(
            client.resolve("https://other.example/x", true).unwrap().as_str(),
            "https://other.example/x"
        );
    }

    #[test]
    fn root_relative_paths_resolve_against_the_host() {
        let client = HttpClient::new("https://h.example/sub").unwrap();
        assert_eq!(
            client.resolve("/docs/x", false).unwrap().as_str(),
            "https://h.example/docs/x"
        );
    }

    #[test]
    fn cookies_are_redacted() {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_static("session=secret"));
        h.insert("accept", HeaderValue::from_static("text/html"));
        let redacted = redact_headers(&h);
        assert!(redacted.contains(&("cookie".to_string(), "<redacted>".to_string())));
        assert!(redacted.contains(&("accept".to_string(), "text/html".to_string())));
    }
}
