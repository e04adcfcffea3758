use anyhow::{Context, Result};
use docmirror_common::observability::{LogConfig, LogFormat};
use docmirror_config::{LogFormatKind, LoggingConfig, MirrorConfig};
use docmirror_http::HttpClient;
use docmirror_web::{ExtractOptions, MirrorOptions, MirrorReport};
use std::time::Duration;

pub fn log_config(cfg: &LoggingConfig) -> LogConfig {
    LogConfig {
        write_file: cfg.file,
        log_dir: cfg.dir.clone(),
        format: match cfg.format {
            LogFormatKind::Text => LogFormat::Text,
            LogFormatKind::Json => LogFormat::Json,
        },
        default_filter: cfg.level.clone(),
        ..LogConfig::default()
    }
}

pub fn http_client(cfg: &MirrorConfig) -> Result<HttpClient> {
    let mut client = HttpClient::new(&cfg.site.root_url)
        .with_context(|| format!("invalid site root: {}", cfg.site.root_url))?
        .with_timeout(cfg.http.timeout_secs.map(Duration::from_secs))
        .with_retries(cfg.http.retries);
    if let Some(ua) = &cfg.http.user_agent {
        client = client.with_user_agent(ua)?;
    }
    Ok(client)
}

pub fn mirror_options(cfg: &MirrorConfig, write_readme: bool) -> MirrorOptions {
    MirrorOptions {
        output_dir: cfg.output.dir.clone(),
        docs_dir: cfg.output.docs_dir.clone(),
        index_file: cfg.output.index_file.clone(),
        readme: write_readme.then(|| cfg.output.readme.clone()),
        readme_link_prefix: cfg.output.readme_link_prefix.clone(),
        extract: ExtractOptions {
            lang: cfg.output.lang.clone(),
            stylesheet: cfg.output.stylesheet.clone(),
            code_language: cfg.extract.code_language.clone(),
        },
    }
}

/// Final console tally; failures were already logged one by one.
pub fn report_summary(report: &MirrorReport) {
    for failure in &report.failures {
        tracing::debug!(index = failure.index + 1, title = %failure.title, url = %failure.url, "article.skipped");
    }
    tracing::info!(
        mirrored = report.articles.len(),
        failed = report.failures.len(),
        links = report.links_found,
        dangling = report.dangling.len(),
        index = %report.index_path.display(),
        "all done: {} of {} articles mirrored",
        report.articles.len(),
        report.links_found
    );
}
