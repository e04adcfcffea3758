//! Sequential mirror run: list links, process each article, persist indexes.

use crate::article::{ExtractOptions, extract_article};
use crate::error::MirrorError;
use crate::fetch::PageFetcher;
use crate::index::write_index;
use crate::menu::list_links;
use crate::readme::update_readme;
use docmirror_common::{ArticleInfo, LinkItem};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Output layout for a run.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Output root; paths in the index are relative to it.
    pub output_dir: PathBuf,
    pub docs_dir: String,
    pub index_file: String,
    /// README to regenerate; `None` skips it.
    pub readme: Option<PathBuf>,
    pub readme_link_prefix: String,
    pub extract: ExtractOptions,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            docs_dir: "docs".into(),
            index_file: "indexes.json".into(),
            readme: Some(PathBuf::from("README.md")),
            readme_link_prefix: "dist/".into(),
            extract: ExtractOptions::default(),
        }
    }
}

impl MirrorOptions {
    pub fn docs_path(&self) -> PathBuf {
        self.output_dir.join(&self.docs_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.docs_path().join(&self.index_file)
    }
}

/// An article that was skipped.
#[derive(Debug)]
pub struct ArticleFailure {
    /// Zero-based position in the link list.
    pub index: usize,
    pub title: String,
    pub url: String,
    pub error: MirrorError,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct MirrorReport {
    pub links_found: usize,
    /// Mirrored articles in processing order, as written to the index.
    pub articles: Vec<ArticleInfo>,
    pub failures: Vec<ArticleFailure>,
    /// Keys that mirrored articles link to but for which no file exists.
    pub dangling: BTreeSet<String>,
    pub index_path: PathBuf,
    pub readme_path: Option<PathBuf>,
}

pub struct Mirror<F> {
    fetcher: F,
    opts: MirrorOptions,
}

impl<F: PageFetcher> Mirror<F> {
    pub fn new(fetcher: F, opts: MirrorOptions) -> Self {
        Self { fetcher, opts }
    }

    pub fn options(&self) -> &MirrorOptions {
        &self.opts
    }

    /// Run the whole batch.
    ///
    /// Only a failed link listing or a failed index/README write is returned
    /// as an error; article failures are logged and collected in the report.
    pub async fn run(&self) -> Result<MirrorReport, MirrorError> {
        let links = list_links(&self.fetcher).await?;

        let docs = self.opts.docs_path();
        tokio::fs::create_dir_all(&docs)
            .await
            .map_err(|e| MirrorError::io(&docs, e))?;

        let total = links.len();
        let width = total.to_string().len();
        let mut articles = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut linked = BTreeSet::new();
        let mut written = BTreeSet::new();

        for (i, item) in links.iter().enumerate() {
            let pos = format!("[{:0width$}/{}]", i + 1, total);
            match self.process_article(item).await {
                Ok((info, key, link_keys)) => {
                    tracing::debug!(target: "mirror.article", %pos, title = %item.title, path = %info.path, "article.ok");
                    written.insert(key);
                    linked.extend(link_keys);
                    articles.push(info);
                }
                Err(error) => {
                    tracing::warn!(target: "mirror.article", %pos, title = %item.title, url = %item.url, %error, "article.failed");
                    failures.push(ArticleFailure {
                        index: i,
                        title: item.title.clone(),
                        url: item.url.clone(),
                        error,
                    });
                }
            }
        }

        let index_path = self.opts.index_path();
        write_index(&index_path, &articles).await?;

        if let Some(readme) = &self.opts.readme {
            update_readme(readme, &articles, &self.opts.readme_link_prefix).await?;
        }

        let mut dangling = BTreeSet::new();
        for key in linked.difference(&written) {
            let target = docs.join(format!("{key}.html"));
            if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
                dangling.insert(key.clone());
            }
        }
        if !dangling.is_empty() {
            tracing::warn!(target: "mirror", count = dangling.len(), keys = ?dangling, "links.dangling");
        }

        tracing::info!(
            target: "mirror",
            mirrored = articles.len(),
            failed = failures.len(),
            total,
            index = %index_path.display(),
            "mirror.done"
        );

        Ok(MirrorReport {
            links_found: total,
            articles,
            failures,
            dangling,
            index_path,
            readme_path: self.opts.readme.clone(),
        })
    }

    /// Fetch, extract and write one article. Nothing is written on failure.
    async fn process_article(
        &self,
        item: &LinkItem,
    ) -> Result<(ArticleInfo, String, Vec<String>), MirrorError> {
        let html = self
            .fetcher
            .fetch_page(&item.url)
            .await
            .map_err(|source| MirrorError::ArticleFetch {
                url: self.fetcher.page_url(&item.url),
                source,
            })?;

        let extracted = extract_article(item, &html, &self.opts.extract)?;

        let file_name = format!("{}.html", extracted.key);
        let path = self.opts.docs_path().join(&file_name);
        tokio::fs::write(&path, extracted.document.as_bytes())
            .await
            .map_err(|e| MirrorError::io(&path, e))?;

        let info = ArticleInfo {
            title: item.title.clone(),
            path: format!("{}/{}", self.opts.docs_dir, file_name),
            summary: extracted.summary,
        };
        Ok((info, extracted.key, extracted.link_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docmirror_http::HttpError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory site; records fetch order.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, String>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn page(mut self, path: &str, html: &str) -> Self {
            self.pages.insert(path.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch_page(&self, path: &str) -> Result<String, HttpError> {
            self.fetched.lock().unwrap().push(path.to_string());
            self.pages.get(path).cloned().ok_or_else(|| HttpError::Network {
                url: self.page_url(path),
                message: "connection refused".into(),
            })
        }

        fn page_url(&self, path: &str) -> String {
            format!("https://docs.test{path}")
        }
    }

    fn menu(links: &[(&str, &str)]) -> String {
        links
            .iter()
            .map(|(url, title)| {
                format!(r#"<li><a class="menu__link" tabindex="0" href="{url}">{title}</a></li>"#)
            })
            .collect()
    }

    fn article(body: &str) -> String {
        format!(
            r#"<article><div class="theme-doc-markdown markdown">{body}</div></article>"#
        )
    }

    fn options(tmp: &TempDir) -> MirrorOptions {
        MirrorOptions {
            output_dir: tmp.path().join("dist"),
            readme: Some(tmp.path().join("README.md")),
            ..MirrorOptions::default()
        }
    }

    #[tokio::test]
    async fn processes_in_order_and_skips_failures() {
        let tmp = TempDir::new().unwrap();
        let site = FakeSite::default()
            .page(
                "",
                &menu(&[("/a", "A"), ("/missing", "Missing"), ("/empty", "Empty"), ("/b", "B")]),
            )
            .page("/a", &article(r#"<p>see <a href="/b">b</a> and <a href="/gone">gone</a></p>"#))
            .page("/empty", "<html>no content block</html>")
            .page("/b", &article("<p>b</p>"));

        let mirror = Mirror::new(site, options(&tmp));
        let report = mirror.run().await.unwrap();

        assert_eq!(report.links_found, 4);
        let titles: Vec<_> = report.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);

        let failed: Vec<_> = report.failures.iter().map(|f| (f.index, f.title.as_str())).collect();
        assert_eq!(failed, [(1, "Missing"), (2, "Empty")]);
        assert!(matches!(report.failures[0].error, MirrorError::ArticleFetch { .. }));
        assert!(matches!(report.failures[1].error, MirrorError::ContentNotFound { .. }));

        assert_eq!(
            mirror.fetcher.fetched.lock().unwrap().as_slice(),
            ["", "/a", "/missing", "/empty", "/b"]
        );

        let docs = tmp.path().join("dist").join("docs");
        assert!(docs.join(format!("{}.html", crate::filename_key("/a"))).exists());
        assert!(!docs.join(format!("{}.html", crate::filename_key("/missing"))).exists());
        assert_eq!(std::fs::read_dir(&docs).unwrap().count(), 3); // two articles + index

        assert_eq!(
            report.dangling.into_iter().collect::<Vec<_>>(),
            vec![crate::filename_key("/gone")]
        );
        assert!(tmp.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn failed_listing_aborts_before_writing() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(FakeSite::default(), options(&tmp));

        let err = mirror.run().await.unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(err, MirrorError::ListFetch { ref url, .. } if url == "https://docs.test"));
        assert!(!tmp.path().join("dist").exists());
        assert!(!tmp.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn empty_menu_writes_empty_index() {
        let tmp = TempDir::new().unwrap();
        let site = FakeSite::default().page("", "<nav></nav>");
        let mirror = Mirror::new(site, options(&tmp));

        let report = mirror.run().await.unwrap();

        assert!(report.articles.is_empty());
        assert_eq!(std::fs::read_to_string(report.index_path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn readme_can_be_skipped() {
        let tmp = TempDir::new().unwrap();
        let site = FakeSite::default().page("", "");
        let opts = MirrorOptions {
            readme: None,
            ..options(&tmp)
        };

        let report = Mirror::new(site, opts).run().await.unwrap();

        assert!(report.readme_path.is_none());
        assert!(!tmp.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn unwritable_article_is_skipped_and_run_continues() {
        let tmp = TempDir::new().unwrap();
        let site = FakeSite::default()
            .page("", &menu(&[("/a", "A"), ("/blocked", "Blocked"), ("/b", "B")]))
            .page("/a", &article("<p>a</p>"))
            .page("/blocked", &article("<p>blocked</p>"))
            .page("/b", &article("<p>b</p>"));
        let opts = options(&tmp);

        // A directory where the article file should go makes the write fail.
        let blocked = opts
            .docs_path()
            .join(format!("{}.html", crate::filename_key("/blocked")));
        std::fs::create_dir_all(&blocked).unwrap();

        let report = Mirror::new(site, opts).run().await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert!(matches!(
            &report.failures[0].error,
            MirrorError::Io { path, .. } if *path == blocked
        ));
        assert!(!report.failures[0].error.is_fatal());

        let titles: Vec<_> = report.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
        let b_file = tmp
            .path()
            .join("dist")
            .join("docs")
            .join(format!("{}.html", crate::filename_key("/b")));
        assert!(b_file.exists());

        let index = crate::index::read_index(&report.index_path).await.unwrap();
        assert_eq!(index, report.articles);
    }
}
