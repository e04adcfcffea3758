use anyhow::{Context, Result};
use clap::Parser;
use docmirror_common::observability::init_logging;
use docmirror_config::{MirrorConfig, MirrorConfigLoader};
use docmirror_web::Mirror;
use runner::{http_client, log_config, mirror_options, report_summary};
use std::path::PathBuf;
mod runner;

const DEFAULT_CONFIG: &str = "docmirror.yaml";

/// Mirror a documentation site into standalone offline HTML files.
#[derive(Parser, Debug)]
#[command(name = "docmirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./docmirror.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Site root to mirror
    #[arg(long)]
    root_url: Option<String>,

    /// Output root directory
    #[arg(long)]
    output: Option<PathBuf>,

    /// README file to regenerate
    #[arg(long, conflicts_with = "no_readme")]
    readme: Option<PathBuf>,

    /// Do not touch the README
    #[arg(long)]
    no_readme: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Also write a daily log file into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn load_config(cli: &Cli) -> Result<MirrorConfig> {
    let mut loader = match &cli.config {
        Some(path) => MirrorConfigLoader::new().with_file(path),
        None => MirrorConfigLoader::new().with_optional_file(DEFAULT_CONFIG),
    };
    if let Some(root) = &cli.root_url {
        loader = loader.with_override("site.root_url", root.as_str());
    }
    if let Some(out) = &cli.output {
        loader = loader.with_override("output.dir", out.to_string_lossy().as_ref());
    }
    if let Some(readme) = &cli.readme {
        loader = loader.with_override("output.readme", readme.to_string_lossy().as_ref());
    }
    if let Some(dir) = &cli.log_dir {
        loader = loader
            .with_override("logging.dir", dir.to_string_lossy().as_ref())
            .with_override("logging.file", true);
    }
    if cli.verbose {
        loader = loader.with_override("logging.level", "debug");
    }
    if cli.json_logs {
        loader = loader.with_override("logging.format", "json");
    }
    loader.load().context("invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (CLI > env > file > defaults)
    let cfg = load_config(&cli)?;

    init_logging(log_config(&cfg.logging))?;

    let client = http_client(&cfg)?;
    let mirror = Mirror::new(client, mirror_options(&cfg, !cli.no_readme));

    tracing::info!(root = %cfg.site.root_url, output = %cfg.output.dir.display(), "mirror.start");
    let report = mirror.run().await.context("mirror run failed")?;
    report_summary(&report);

    Ok(())
}
