use crate::error::MirrorError;
use docmirror_common::ArticleInfo;
use std::path::Path;
use tokio::fs;

/// Write the index as a compact JSON array of `{t, p, d}` records.
///
/// Overwrites any previous index; parent directories are created.
pub async fn write_index(path: &Path, articles: &[ArticleInfo]) -> Result<(), MirrorError> {
    let json = serde_json::to_string(articles)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| MirrorError::io(parent, e))?;
    }
    fs::write(path, json)
        .await
        .map_err(|e| MirrorError::io(path, e))?;
    tracing::debug!(target: "mirror.index", path = %path.display(), entries = articles.len(), "index.written");
    Ok(())
}

/// Load a previously written index, e.g. to inspect or re-render a mirror.
pub async fn read_index(path: &Path) -> Result<Vec<ArticleInfo>, MirrorError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| MirrorError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}
